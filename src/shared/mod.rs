//! Cross-cutting settings and fixed user-facing text.

pub mod config;
pub mod messages;
