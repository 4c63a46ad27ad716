//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{AnswerCandidate, DomainError, IntentResult, Turn};

/// Intent classification. Never fails: a disabled or unreachable recognizer
/// yields `IntentResult::none()`.
#[async_trait::async_trait]
pub trait RecognizerPort: Send + Sync {
    async fn recognize(&self, turn: &Turn) -> IntentResult;

    /// Whether the recognizer was constructed with complete credentials.
    fn is_enabled(&self) -> bool;
}

/// Hosted question answering. Returns ranked candidates, most confident first.
///
/// Failures are logged by the adapter and surface as an empty list.
#[async_trait::async_trait]
pub trait KnowledgeBasePort: Send + Sync {
    async fn query(&self, question: &str) -> Vec<AnswerCandidate>;
}

/// Appointment booking backend. Both operations return user-facing text.
#[async_trait::async_trait]
pub trait SchedulerPort: Send + Sync {
    /// Try to book an appointment from the turn and its recognized entities.
    async fn schedule_appointment(
        &self,
        turn: &Turn,
        intent: &IntentResult,
    ) -> Result<String, DomainError>;

    /// Describe current availability.
    async fn get_availability(&self) -> Result<String, DomainError>;
}

/// Delivers reply text back to the conversation a turn came from.
#[async_trait::async_trait]
pub trait ReplyPort: Send + Sync {
    async fn send_text(&self, turn: &Turn, text: &str) -> Result<(), DomainError>;
}
