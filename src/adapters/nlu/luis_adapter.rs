//! LUIS prediction adapter. Implements RecognizerPort over the v3 prediction REST API.
//!
//! Capability is decided once at construction: without app id, key and host the
//! adapter is disabled and never touches the network.

use crate::adapters::nlu::mapper::PredictionResponse;
use crate::domain::{DomainError, IntentResult, Turn};
use crate::ports::RecognizerPort;
use crate::shared::config::RecognizerSettings;
use tracing::{debug, info, warn};

/// Prediction API version segment.
pub const PREDICTION_API_VERSION: &str = "v3.0";

/// Published slot queried for predictions.
const PREDICTION_SLOT: &str = "production";

pub struct LuisRecognizer {
    client: reqwest::Client,
    settings: Option<RecognizerSettings>,
    enabled: bool,
}

impl LuisRecognizer {
    /// Create a recognizer. `None` yields a disabled recognizer.
    pub fn new(settings: Option<RecognizerSettings>) -> Self {
        let enabled = settings.is_some();
        Self {
            client: reqwest::Client::new(),
            settings,
            enabled,
        }
    }

    /// Create from individually optional parts. Any missing part disables the recognizer.
    pub fn from_parts(
        app_id: Option<String>,
        endpoint_key: Option<String>,
        host: Option<String>,
    ) -> Self {
        let settings = match (app_id, endpoint_key, host) {
            (Some(app_id), Some(endpoint_key), Some(host)) => Some(RecognizerSettings {
                app_id,
                endpoint_key,
                host,
            }),
            _ => None,
        };
        Self::new(settings)
    }

    /// Disabled recognizer; `recognize` always returns the neutral result.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Prediction URL for the configured app. Hosts without a scheme get `https://`.
    fn prediction_url(settings: &RecognizerSettings) -> String {
        let host = settings.host.trim_end_matches('/');
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        format!(
            "{}/luis/prediction/{}/apps/{}/slots/{}/predict",
            base, PREDICTION_API_VERSION, settings.app_id, PREDICTION_SLOT
        )
    }

    async fn predict(
        &self,
        settings: &RecognizerSettings,
        text: &str,
    ) -> Result<IntentResult, DomainError> {
        let url = Self::prediction_url(settings);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("subscription-key", settings.endpoint_key.as_str()),
                ("query", text),
                ("show-all-intents", "true"),
            ])
            .send()
            .await
            .map_err(|e| DomainError::Recognizer(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Recognizer(format!(
                "API error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: PredictionResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Recognizer(format!("Failed to parse prediction: {}", e)))?;

        Ok(parsed.into_intent_result())
    }
}

#[async_trait::async_trait]
impl RecognizerPort for LuisRecognizer {
    /// Disabled: neutral result, no request. Enabled: exactly one prediction
    /// request with the turn's raw text (empty text included); a failed call
    /// is logged and also yields the neutral result.
    async fn recognize(&self, turn: &Turn) -> IntentResult {
        let settings = match (&self.settings, self.enabled) {
            (Some(s), true) => s,
            _ => return IntentResult::none(),
        };

        match self.predict(settings, &turn.text).await {
            Ok(result) => {
                info!(intent = %result.intent, score = result.score, "intent recognized");
                debug!(entities = result.entities.len(), "recognized entities");
                result
            }
            Err(e) => {
                warn!(error = %e, "recognizer call failed; continuing without intent");
                IntentResult::none()
            }
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
