//! Domain entities. Pure data structures for the assistant's per-turn data.
//!
//! No channel/HTTP wire types here — adapters map into these.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Intent label returned when nothing was recognized (or the recognizer is disabled).
pub const NONE_INTENT: &str = "None";

/// Accept threshold for intent and knowledge-base scores. Comparisons are strict (`>`).
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Recognized entities, keyed by entity name. Shape is owned by the recognizer.
pub type Entities = Map<String, Value>;

/// A participant in a conversation (user or bot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnKind {
    /// A user message carrying text.
    Message,
    /// Members joined the conversation (welcome path).
    MembersAdded,
    /// Anything else the channel delivers (typing, reactions, ...). Ignored.
    Other(String),
}

/// Where a reply to a turn must be delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationRef {
    pub id: String,
    /// Channel connector base URL the turn arrived from.
    pub service_url: String,
    /// Id of the inbound activity; replies thread under it.
    pub activity_id: Option<String>,
}

/// One inbound conversational event. Created per request, consumed once.
#[derive(Debug, Clone)]
pub struct Turn {
    pub kind: TurnKind,
    pub text: String,
    pub from: Member,
    /// The bot's own identity on this channel.
    pub recipient: Member,
    pub conversation: ConversationRef,
    pub members_added: Vec<Member>,
}

impl Turn {
    /// Build a plain message turn. Used by tests and the socket transport.
    pub fn message(text: impl Into<String>, from: Member, recipient: Member) -> Self {
        Self {
            kind: TurnKind::Message,
            text: text.into(),
            from,
            recipient,
            conversation: ConversationRef::default(),
            members_added: Vec::new(),
        }
    }

    /// Members added by this turn, excluding the bot itself.
    pub fn new_members(&self) -> impl Iterator<Item = &Member> {
        self.members_added
            .iter()
            .filter(move |m| m.id != self.recipient.id)
    }
}

/// Output of the intent recognizer, normalized from whichever response shape it returned.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentResult {
    pub intent: String,
    /// Confidence in [0, 1].
    pub score: f64,
    pub entities: Entities,
}

impl IntentResult {
    /// Neutral result: `{intent: "None", score: 0, entities: {}}`.
    pub fn none() -> Self {
        Self {
            intent: NONE_INTENT.to_string(),
            score: 0.0,
            entities: Entities::new(),
        }
    }

    /// True when the label matches and the score clears the threshold (strict).
    pub fn is_confident(&self, intent: &str) -> bool {
        self.intent == intent && self.score > CONFIDENCE_THRESHOLD
    }
}

/// Normalized date/time expression pulled from recognizer entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeExpression {
    /// TIMEX expression, e.g. `2026-10-20T15`.
    pub timex: String,
    /// First resolved value, e.g. `2026-10-20 15:00:00`, when the recognizer supplied one.
    pub value: Option<String>,
}

/// One ranked knowledge-base answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerCandidate {
    pub answer: String,
    pub confidence_score: f64,
}

impl AnswerCandidate {
    pub fn is_confident(&self) -> bool {
        self.confidence_score > CONFIDENCE_THRESHOLD
    }
}
