//! Inbound port. The channel transport calls into the application.

use crate::domain::{DomainError, Turn};

/// Turn handler: produces the reply texts for one inbound turn.
///
/// A message turn yields exactly one reply; a members-added turn yields one
/// welcome per new member; anything else yields none.
#[async_trait::async_trait]
pub trait TurnHandler: Send + Sync {
    async fn on_turn(&self, turn: &Turn) -> Result<Vec<String>, DomainError>;
}
