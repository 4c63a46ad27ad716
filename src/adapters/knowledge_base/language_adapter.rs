//! Hosted question-answering adapter. Implements KnowledgeBasePort.
//!
//! One POST per question against the Language service `query-knowledgebases`
//! route. No retry, no caching. Every failure is logged and becomes an empty list.

use crate::domain::{AnswerCandidate, DomainError};
use crate::ports::KnowledgeBasePort;
use crate::shared::config::KnowledgeBaseSettings;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const KB_API_VERSION: &str = "2021-10-01";

/// Number of ranked candidates requested per question.
pub const KB_TOP_ANSWERS: u32 = 3;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

pub struct LanguageKbAdapter {
    client: reqwest::Client,
    settings: Option<KnowledgeBaseSettings>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    question: &'a str,
    top: u32,
    include_unstructured_sources: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    answers: Vec<AnswerCandidate>,
}

impl LanguageKbAdapter {
    /// Create the adapter. `None` disables it: every query returns no answers.
    pub fn new(settings: Option<KnowledgeBaseSettings>) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.is_some()
    }

    fn query_url(settings: &KnowledgeBaseSettings) -> String {
        format!(
            "{}/language/:query-knowledgebases",
            settings.endpoint.trim_end_matches('/')
        )
    }

    async fn try_query(
        &self,
        settings: &KnowledgeBaseSettings,
        question: &str,
    ) -> Result<Vec<AnswerCandidate>, DomainError> {
        let body = QueryRequest {
            question,
            top: KB_TOP_ANSWERS,
            include_unstructured_sources: true,
        };

        let response = self
            .client
            .post(Self::query_url(settings))
            .query(&[
                ("projectName", settings.project.as_str()),
                ("deploymentName", settings.deployment.as_str()),
                ("api-version", KB_API_VERSION),
            ])
            .header(SUBSCRIPTION_KEY_HEADER, &settings.key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::KnowledgeBase(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DomainError::KnowledgeBase(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let parsed: QueryResponse = response.json().await.map_err(|e| {
            DomainError::KnowledgeBase(format!("Failed to parse answers: {}", e))
        })?;
        Ok(parsed.answers)
    }
}

#[async_trait::async_trait]
impl KnowledgeBasePort for LanguageKbAdapter {
    async fn query(&self, question: &str) -> Vec<AnswerCandidate> {
        let Some(settings) = &self.settings else {
            return Vec::new();
        };
        match self.try_query(settings, question).await {
            Ok(answers) => {
                debug!(
                    answers = answers.len(),
                    top_score = answers.first().map(|a| a.confidence_score),
                    "knowledge base answered"
                );
                answers
            }
            Err(e) => {
                warn!(error = %e, "knowledge base query failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const QUERY_PATH: &str = "/language/:query-knowledgebases";

    fn settings(endpoint: String) -> KnowledgeBaseSettings {
        KnowledgeBaseSettings {
            endpoint,
            key: "kb-key".into(),
            project: "dental".into(),
            deployment: "production".into(),
        }
    }

    #[tokio::test]
    async fn test_query_sends_contract_and_parses_answers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", QUERY_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("projectName".into(), "dental".into()),
                Matcher::UrlEncoded("deploymentName".into(), "production".into()),
                Matcher::UrlEncoded("api-version".into(), "2021-10-01".into()),
            ]))
            .match_header("Ocp-Apim-Subscription-Key", "kb-key")
            .match_body(Matcher::Json(serde_json::json!({
                "question": "When do you open?",
                "top": 3,
                "includeUnstructuredSources": true
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "answers": [
                        {"answer": "We open at 9am", "confidenceScore": 0.9, "id": 4, "source": "faq"},
                        {"answer": "Call us", "confidenceScore": 0.2}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let kb = LanguageKbAdapter::new(Some(settings(format!("{}/", server.url()))));
        let answers = kb.query("When do you open?").await;
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].answer, "We open at 9am");
        assert!((answers[0].confidence_score - 0.9).abs() < f64::EPSILON);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_payload_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", QUERY_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{\"answers\": \"nope\"")
            .create_async()
            .await;

        let kb = LanguageKbAdapter::new(Some(settings(server.url())));
        assert!(kb.query("hours?").await.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", QUERY_PATH)
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let kb = LanguageKbAdapter::new(Some(settings(server.url())));
        assert!(kb.query("hours?").await.is_empty());
    }

    #[tokio::test]
    async fn test_network_error_is_empty() {
        // Nothing listens on port 9 (discard) locally.
        let kb = LanguageKbAdapter::new(Some(settings("http://127.0.0.1:9".into())));
        assert!(kb.query("hours?").await.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_returns_empty() {
        let kb = LanguageKbAdapter::new(None);
        assert!(!kb.is_enabled());
        assert!(kb.query("hours?").await.is_empty());
    }
}
