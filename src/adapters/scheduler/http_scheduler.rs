//! Scheduling backend adapter. Implements SchedulerPort over a small REST contract.
//!
//! `POST {base}/appointments` books, `GET {base}/availability` reports openings.
//! Both answer with plain text that is relayed to the user verbatim.

use crate::adapters::nlu::get_time_entity;
use crate::domain::{DomainError, IntentResult, TimeExpression, Turn};
use crate::ports::SchedulerPort;
use crate::shared::messages::TIME_PROMPT_MESSAGE;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

pub struct HttpScheduler {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize, PartialEq)]
struct AppointmentRequest {
    customer: String,
    timex: String,
    /// ISO-8601 local start, when the recognizer resolved a concrete value.
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<String>,
}

impl HttpScheduler {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn appointment_request(turn: &Turn, time: TimeExpression) -> AppointmentRequest {
        let customer = turn
            .from
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| turn.from.id.clone());
        AppointmentRequest {
            customer,
            start: time.value.as_deref().and_then(resolve_start),
            timex: time.timex,
        }
    }

    async fn text_of(response: reqwest::Response) -> Result<String, DomainError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DomainError::Scheduler(format!("Failed to read response: {}", e)))?;
        if !status.is_success() {
            return Err(DomainError::Scheduler(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }
        Ok(text)
    }
}

/// Resolve a recognizer value like `2026-10-20 15:00:00` into `2026-10-20T15:00:00`.
fn resolve_start(value: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

#[async_trait::async_trait]
impl SchedulerPort for HttpScheduler {
    async fn schedule_appointment(
        &self,
        turn: &Turn,
        intent: &IntentResult,
    ) -> Result<String, DomainError> {
        let Some(time) = get_time_entity(intent) else {
            return Ok(TIME_PROMPT_MESSAGE.to_string());
        };
        let request = Self::appointment_request(turn, time);
        info!(timex = %request.timex, "booking appointment");

        let response = self
            .client
            .post(format!("{}/appointments", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Scheduler(format!("HTTP request failed: {}", e)))?;
        Self::text_of(response).await
    }

    async fn get_availability(&self) -> Result<String, DomainError> {
        let response = self
            .client
            .get(format!("{}/availability", self.base_url))
            .send()
            .await
            .map_err(|e| DomainError::Scheduler(format!("HTTP request failed: {}", e)))?;
        Self::text_of(response).await
    }
}
