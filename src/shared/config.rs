//! Application configuration. Collaborator endpoints, credentials, listen port.

use serde::Deserialize;

/// Default listen port for the webhook (channel emulator convention).
pub const DEFAULT_PORT: u16 = 3978;

/// Default scheduling backend when none is configured.
pub const DEFAULT_SCHEDULER_URL: &str = "http://localhost:5000";

/// Default knowledge-base deployment slot.
pub const DEFAULT_KB_DEPLOYMENT: &str = "production";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AppConfig {
    /// Listen port. Read from DENTAL_PORT or PORT.
    #[serde(default)]
    pub port: Option<u16>,

    // ─────────────────────────────────────────────────────────────────────────
    // Intent recognizer (LUIS)
    // ─────────────────────────────────────────────────────────────────────────
    /// Recognizer application id. Read from DENTAL_LUIS_APP_ID or LUIS_APP_ID.
    #[serde(default)]
    pub luis_app_id: Option<String>,

    /// Recognizer endpoint key. Read from DENTAL_LUIS_API_KEY or LUIS_API_KEY.
    #[serde(default)]
    pub luis_api_key: Option<String>,

    /// Recognizer host, with or without scheme. Read from DENTAL_LUIS_API_HOST or LUIS_API_HOST_NAME.
    #[serde(default)]
    pub luis_api_host: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Knowledge base (question answering)
    // ─────────────────────────────────────────────────────────────────────────
    /// Language service endpoint. Read from DENTAL_KB_ENDPOINT or LANGUAGE_ENDPOINT.
    #[serde(default)]
    pub kb_endpoint: Option<String>,

    /// Subscription key. Read from DENTAL_KB_KEY or LANGUAGE_KEY.
    #[serde(default)]
    pub kb_key: Option<String>,

    /// Project name. Read from DENTAL_KB_PROJECT or LANGUAGE_PROJECT_NAME.
    #[serde(default)]
    pub kb_project: Option<String>,

    /// Deployment name (default "production"). Read from DENTAL_KB_DEPLOYMENT or LANGUAGE_DEPLOYMENT_NAME.
    #[serde(default)]
    pub kb_deployment: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Scheduler and channel
    // ─────────────────────────────────────────────────────────────────────────
    /// Scheduling backend base URL. Read from DENTAL_SCHEDULER_URL or SCHEDULER_URL.
    #[serde(default)]
    pub scheduler_url: Option<String>,

    /// Channel app id. Read from DENTAL_APP_ID or MicrosoftAppId.
    #[serde(default)]
    pub app_id: Option<String>,

    /// Channel app password. Read from DENTAL_APP_PASSWORD or MicrosoftAppPassword.
    #[serde(default)]
    pub app_password: Option<String>,
}

/// Complete recognizer credentials. Present only when all three parts are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerSettings {
    pub app_id: String,
    pub endpoint_key: String,
    pub host: String,
}

/// Complete knowledge-base connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBaseSettings {
    pub endpoint: String,
    pub key: String,
    pub project: String,
    pub deployment: String,
}

/// Channel client credentials. Absent means local emulator mode (no auth).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCredentials {
    pub app_id: String,
    pub app_password: String,
}

/// Treat empty strings from .env files as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn field_or_env(field: &Option<String>, env_name: &str) -> Option<String> {
    non_empty(field.clone()).or_else(|| non_empty(std::env::var(env_name).ok()))
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("DENTAL"));
        if let Ok(path) = std::env::var("DENTAL_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // PORT is read directly (no prefix) so hosting platforms can inject it
        if cfg.port.is_none() {
            if let Ok(s) = std::env::var("PORT") {
                if let Ok(port) = s.parse::<u16>() {
                    cfg.port = Some(port);
                }
            }
        }
        Ok(cfg)
    }

    /// Returns the listen port. Defaults to 3978.
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Collaborator helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Recognizer credentials if app id, key and host are all present.
    pub fn recognizer_settings(&self) -> Option<RecognizerSettings> {
        Some(RecognizerSettings {
            app_id: field_or_env(&self.luis_app_id, "LUIS_APP_ID")?,
            endpoint_key: field_or_env(&self.luis_api_key, "LUIS_API_KEY")?,
            host: field_or_env(&self.luis_api_host, "LUIS_API_HOST_NAME")?,
        })
    }

    /// Knowledge-base parameters if endpoint, key and project are present.
    pub fn knowledge_base_settings(&self) -> Option<KnowledgeBaseSettings> {
        Some(KnowledgeBaseSettings {
            endpoint: field_or_env(&self.kb_endpoint, "LANGUAGE_ENDPOINT")?,
            key: field_or_env(&self.kb_key, "LANGUAGE_KEY")?,
            project: field_or_env(&self.kb_project, "LANGUAGE_PROJECT_NAME")?,
            deployment: field_or_env(&self.kb_deployment, "LANGUAGE_DEPLOYMENT_NAME")
                .unwrap_or_else(|| DEFAULT_KB_DEPLOYMENT.to_string()),
        })
    }

    /// Returns the scheduler base URL. Defaults to http://localhost:5000.
    pub fn scheduler_url_or_default(&self) -> String {
        field_or_env(&self.scheduler_url, "SCHEDULER_URL")
            .unwrap_or_else(|| DEFAULT_SCHEDULER_URL.to_string())
    }

    /// Channel credentials if both app id and password are present.
    pub fn channel_credentials(&self) -> Option<ChannelCredentials> {
        Some(ChannelCredentials {
            app_id: field_or_env(&self.app_id, "MicrosoftAppId")?,
            app_password: field_or_env(&self.app_password, "MicrosoftAppPassword")?,
        })
    }
}
