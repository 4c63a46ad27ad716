//! Outbound connector. Implements ReplyPort by posting reply activities to the
//! channel's service URL.
//!
//! With credentials, a client-credentials token is fetched and cached until
//! shortly before it expires. Without credentials (local emulator) requests go
//! out unauthenticated.

use crate::adapters::channel::activity::reply_activity;
use crate::domain::{DomainError, Turn};
use crate::ports::ReplyPort;
use crate::shared::config::ChannelCredentials;
use reqwest::Url;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const DEFAULT_TOKEN_URL: &str =
    "https://login.microsoftonline.com/botframework.com/oauth2/v2.0/token";
const TOKEN_SCOPE: &str = "https://api.botframework.com/.default";

/// Refresh this long before the token's stated expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(300);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

pub struct ConnectorClient {
    client: reqwest::Client,
    credentials: Option<ChannelCredentials>,
    token_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl ConnectorClient {
    pub fn new(credentials: Option<ChannelCredentials>) -> Self {
        Self::with_token_url(credentials, DEFAULT_TOKEN_URL)
    }

    /// Use a custom token endpoint (sovereign clouds, tests).
    pub fn with_token_url(
        credentials: Option<ChannelCredentials>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            token_url: token_url.into(),
            token: Mutex::new(None),
        }
    }

    /// `{serviceUrl}/v3/conversations/{id}/activities[/{activityId}]`, each id
    /// percent-encoded as a single path segment.
    fn activities_url(turn: &Turn) -> Result<Url, DomainError> {
        let base = turn.conversation.service_url.trim();
        if base.is_empty() {
            return Err(DomainError::Channel("turn has no service URL".into()));
        }
        let mut url = Url::parse(base)
            .map_err(|e| DomainError::Channel(format!("Invalid service URL {}: {}", base, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| DomainError::Channel(format!("Service URL {} cannot be a base", base)))?;
            segments
                .pop_if_empty()
                .extend(["v3", "conversations", turn.conversation.id.as_str(), "activities"]);
            if let Some(id) = &turn.conversation.activity_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Bearer token for outbound calls, or `None` in emulator mode.
    async fn access_token(&self) -> Result<Option<String>, DomainError> {
        let Some(creds) = &self.credentials else {
            return Ok(None);
        };

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(Some(token.value.clone()));
            }
        }

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", creds.app_id.as_str()),
                ("client_secret", creds.app_password.as_str()),
                ("scope", TOKEN_SCOPE),
            ])
            .send()
            .await
            .map_err(|e| DomainError::Channel(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::Channel(format!(
                "Token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Channel(format!("Failed to parse token: {}", e)))?;

        let lifetime = Duration::from_secs(token.expires_in);
        info!(expires_in = token.expires_in, "channel access token acquired");
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        });
        Ok(Some(token.access_token))
    }
}

#[async_trait::async_trait]
impl ReplyPort for ConnectorClient {
    async fn send_text(&self, turn: &Turn, text: &str) -> Result<(), DomainError> {
        let url = Self::activities_url(turn)?;
        let activity = reply_activity(turn, text);

        let mut request = self.client.post(url).json(&activity);
        if let Some(token) = self.access_token().await? {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Channel(format!("Reply request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Channel(format!(
                "Connector error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        debug!(conversation = %turn.conversation.id, "reply delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConversationRef, Member};
    use mockito::Matcher;

    fn turn(service_url: String) -> Turn {
        let mut t = Turn::message(
            "hi",
            Member {
                id: "user-1".into(),
                name: None,
            },
            Member {
                id: "bot-1".into(),
                name: None,
            },
        );
        t.conversation = ConversationRef {
            id: "conv-1".into(),
            service_url,
            activity_id: Some("act-1".into()),
        };
        t
    }

    #[tokio::test]
    async fn test_emulator_mode_posts_without_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v3/conversations/conv-1/activities/act-1")
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "type": "message",
                "text": "We open at 9am",
                "replyToId": "act-1",
                "recipient": {"id": "user-1"}
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let connector = ConnectorClient::new(None);
        connector
            .send_text(&turn(server.url()), "We open at 9am")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_fetched_once_and_reused() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = server
            .mock("POST", "/token")
            .match_body(Matcher::Regex("grant_type=client_credentials".into()))
            .with_status(200)
            .with_body(r#"{"access_token":"tok-1","expires_in":3600}"#)
            .expect(1)
            .create_async()
            .await;
        let reply_mock = server
            .mock("POST", "/v3/conversations/conv-1/activities/act-1")
            .match_header("authorization", "Bearer tok-1")
            .with_status(200)
            .expect(2)
            .create_async()
            .await;

        let connector = ConnectorClient::with_token_url(
            Some(ChannelCredentials {
                app_id: "bot-id".into(),
                app_password: "secret".into(),
            }),
            format!("{}/token", server.url()),
        );
        let t = turn(server.url());
        connector.send_text(&t, "one").await.unwrap();
        connector.send_text(&t, "two").await.unwrap();
        token_mock.assert_async().await;
        reply_mock.assert_async().await;
    }

    #[test]
    fn test_activities_url_encodes_ids() {
        let mut t = turn("https://smba.example.com/amer/".into());
        t.conversation.id = "19:abc;messageid=1#x y".into();
        t.conversation.activity_id = Some("act/1".into());
        assert_eq!(
            ConnectorClient::activities_url(&t).unwrap().as_str(),
            "https://smba.example.com/amer/v3/conversations/19:abc;messageid=1%23x%20y/activities/act%2F1"
        );

        t.conversation.activity_id = None;
        assert_eq!(
            ConnectorClient::activities_url(&t).unwrap().as_str(),
            "https://smba.example.com/amer/v3/conversations/19:abc;messageid=1%23x%20y/activities"
        );
    }

    #[test]
    fn test_activities_url_rejects_bad_service_url() {
        let err = ConnectorClient::activities_url(&turn("not a url".into())).unwrap_err();
        assert!(matches!(err, DomainError::Channel(_)));
    }

    #[tokio::test]
    async fn test_missing_service_url_is_error() {
        let connector = ConnectorClient::new(None);
        let err = connector.send_text(&turn(String::new()), "x").await.unwrap_err();
        assert!(matches!(err, DomainError::Channel(_)));
    }

    #[tokio::test]
    async fn test_connector_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v3/conversations/conv-1/activities/act-1")
            .with_status(403)
            .create_async()
            .await;

        let connector = ConnectorClient::new(None);
        let err = connector.send_text(&turn(server.url()), "x").await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }
}
