//! Core domain layer. No external I/O dependencies.
//!
//! Entities and routing constants live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    AnswerCandidate, CONFIDENCE_THRESHOLD, ConversationRef, Entities, IntentResult, Member,
    NONE_INTENT, TimeExpression, Turn, TurnKind,
};
pub use errors::DomainError;
