//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Recognizer error: {0}")]
    Recognizer(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Delivering a reply to the channel failed.
    #[error("Channel error: {0}")]
    Channel(String),
}
