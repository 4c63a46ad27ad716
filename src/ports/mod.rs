//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the channel transport into the application
//! - Outbound: Called by application into infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::TurnHandler;
pub use outbound::{KnowledgeBasePort, RecognizerPort, ReplyPort, SchedulerPort};
