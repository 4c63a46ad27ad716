//! Channel activity wire types and their mapping to domain turns.

use crate::domain::{ConversationRef, Member, Turn, TurnKind};
use serde::{Deserialize, Serialize};

pub const MESSAGE_ACTIVITY: &str = "message";
pub const CONVERSATION_UPDATE_ACTIVITY: &str = "conversationUpdate";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAccount {
    pub id: String,
}

/// One channel event. Only the fields the assistant reads or writes are modeled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub from: ChannelAccount,
    #[serde(default)]
    pub recipient: ChannelAccount,
    #[serde(default)]
    pub conversation: ConversationAccount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

fn to_member(account: &ChannelAccount) -> Member {
    Member {
        id: account.id.clone(),
        name: account.name.clone(),
    }
}

fn to_account(member: &Member) -> ChannelAccount {
    ChannelAccount {
        id: member.id.clone(),
        name: member.name.clone(),
    }
}

/// Map an inbound activity to a domain turn.
///
/// * `message` → `TurnKind::Message`
/// * `conversationUpdate` with added members → `TurnKind::MembersAdded`
/// * anything else → `TurnKind::Other`
pub fn activity_to_turn(activity: &Activity) -> Turn {
    let kind = match activity.activity_type.as_str() {
        MESSAGE_ACTIVITY => TurnKind::Message,
        CONVERSATION_UPDATE_ACTIVITY if !activity.members_added.is_empty() => {
            TurnKind::MembersAdded
        }
        other => TurnKind::Other(other.to_string()),
    };
    Turn {
        kind,
        text: activity.text.clone().unwrap_or_default(),
        from: to_member(&activity.from),
        recipient: to_member(&activity.recipient),
        conversation: ConversationRef {
            id: activity.conversation.id.clone(),
            service_url: activity.service_url.clone().unwrap_or_default(),
            activity_id: activity.id.clone(),
        },
        members_added: activity.members_added.iter().map(to_member).collect(),
    }
}

/// Build the outbound message activity answering `turn`. Sender and recipient are swapped.
pub fn reply_activity(turn: &Turn, text: &str) -> Activity {
    Activity {
        activity_type: MESSAGE_ACTIVITY.to_string(),
        text: Some(text.to_string()),
        from: to_account(&turn.recipient),
        recipient: to_account(&turn.from),
        conversation: ConversationAccount {
            id: turn.conversation.id.clone(),
        },
        service_url: Some(turn.conversation.service_url.clone()).filter(|s| !s.is_empty()),
        reply_to_id: turn.conversation.activity_id.clone(),
        ..Activity::default()
    }
}
