//! Turn dispatcher. Routes each message turn to exactly one reply.
//!
//! Order of evaluation per message:
//! 1. Recognize intent.
//! 2. Confident `ScheduleAppointment` → scheduler booking.
//! 3. Confident `GetAvailability` → scheduler availability.
//! 4. Otherwise the knowledge base; a confident first answer is sent as-is.
//! 5. Otherwise the fixed fallback text.
//!
//! No state survives a turn.

use crate::domain::{DomainError, Turn, TurnKind};
use crate::ports::{KnowledgeBasePort, RecognizerPort, SchedulerPort, TurnHandler};
use crate::shared::messages::{FALLBACK_MESSAGE, WELCOME_MESSAGE};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const SCHEDULE_APPOINTMENT_INTENT: &str = "ScheduleAppointment";
pub const GET_AVAILABILITY_INTENT: &str = "GetAvailability";

/// Which branch produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Scheduled,
    Availability,
    Answered,
    Fallback,
}

/// The single reply for a message turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub route: Route,
    pub reply: String,
}

impl Dispatch {
    fn new(route: Route, reply: impl Into<String>) -> Self {
        Self {
            route,
            reply: reply.into(),
        }
    }

    fn fallback() -> Self {
        Self::new(Route::Fallback, FALLBACK_MESSAGE)
    }
}

pub struct TurnDispatcher {
    recognizer: Arc<dyn RecognizerPort>,
    knowledge_base: Arc<dyn KnowledgeBasePort>,
    scheduler: Arc<dyn SchedulerPort>,
}

impl TurnDispatcher {
    pub fn new(
        recognizer: Arc<dyn RecognizerPort>,
        knowledge_base: Arc<dyn KnowledgeBasePort>,
        scheduler: Arc<dyn SchedulerPort>,
    ) -> Self {
        Self {
            recognizer,
            knowledge_base,
            scheduler,
        }
    }

    /// Produce the reply for a message turn.
    pub async fn on_message(&self, turn: &Turn) -> Result<Dispatch, DomainError> {
        let intent = self.recognizer.recognize(turn).await;
        debug!(intent = %intent.intent, score = intent.score, "dispatching turn");

        if intent.is_confident(SCHEDULE_APPOINTMENT_INTENT) {
            return Ok(
                match self.scheduler.schedule_appointment(turn, &intent).await {
                    Ok(text) => Dispatch::new(Route::Scheduled, text),
                    Err(e) => {
                        warn!(error = %e, "scheduling failed");
                        Dispatch::fallback()
                    }
                },
            );
        }

        if intent.is_confident(GET_AVAILABILITY_INTENT) {
            return Ok(match self.scheduler.get_availability().await {
                Ok(text) => Dispatch::new(Route::Availability, text),
                Err(e) => {
                    warn!(error = %e, "availability lookup failed");
                    Dispatch::fallback()
                }
            });
        }

        let answers = self.knowledge_base.query(&turn.text).await;
        Ok(match answers.into_iter().next() {
            Some(top) if top.is_confident() => Dispatch::new(Route::Answered, top.answer),
            _ => Dispatch::fallback(),
        })
    }

    /// One welcome per newly added member, skipping the bot. Not deduplicated:
    /// the same event handled twice welcomes twice.
    pub fn welcome_messages(&self, turn: &Turn) -> Vec<String> {
        turn.new_members()
            .map(|_| WELCOME_MESSAGE.to_string())
            .collect()
    }
}

#[async_trait::async_trait]
impl TurnHandler for TurnDispatcher {
    async fn on_turn(&self, turn: &Turn) -> Result<Vec<String>, DomainError> {
        match &turn.kind {
            TurnKind::Message => {
                let dispatch = self.on_message(turn).await?;
                info!(
                    route = ?dispatch.route,
                    conversation = %turn.conversation.id,
                    "reply selected"
                );
                Ok(vec![dispatch.reply])
            }
            TurnKind::MembersAdded => Ok(self.welcome_messages(turn)),
            TurnKind::Other(kind) => {
                debug!(kind = %kind, "ignoring turn");
                Ok(Vec::new())
            }
        }
    }
}
