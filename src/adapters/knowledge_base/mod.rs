//! Knowledge-base adapter. Implements KnowledgeBasePort.

pub mod language_adapter;

pub use language_adapter::LanguageKbAdapter;
