//! Infrastructure adapters. Implement outbound ports and the inbound transport.
//!
//! Recognizer, knowledge base, scheduler, channel. Map errors to DomainError.

pub mod channel;
pub mod knowledge_base;
pub mod nlu;
pub mod scheduler;
