//! Domain events - emitted after a chat, message or reaction change commits
//!
//! Consumers receive them through the `EventNotifier` port. No delivery order
//! or at-least-once guarantee is attached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{ChatType, ReactionToggle};
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    ChatCreated(ChatCreatedEvent),
    MessageAppended(MessageAppendedEvent),
    ReactionToggled(ReactionToggledEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChatCreated(_) => "CHAT_CREATED",
            Self::MessageAppended(_) => "MESSAGE_APPENDED",
            Self::ReactionToggled(_) => "REACTION_TOGGLED",
        }
    }

    pub fn chat_id(&self) -> Snowflake {
        match self {
            Self::ChatCreated(e) => e.chat_id,
            Self::MessageAppended(e) => e.chat_id,
            Self::ReactionToggled(e) => e.chat_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ChatCreated(e) => e.timestamp,
            Self::MessageAppended(e) => e.timestamp,
            Self::ReactionToggled(e) => e.timestamp,
        }
    }

    /// Wire shape for downstream fan-out
    pub fn envelope(&self) -> EventEnvelope {
        let payload = match self {
            Self::ChatCreated(e) => serde_json::to_value(e),
            Self::MessageAppended(e) => serde_json::to_value(e),
            Self::ReactionToggled(e) => serde_json::to_value(e),
        }
        .unwrap_or(serde_json::Value::Null);

        EventEnvelope {
            kind: self.kind().to_string(),
            chat_id: self.chat_id(),
            payload,
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCreatedEvent {
    pub chat_id: Snowflake,
    pub chat_type: ChatType,
    pub member_ids: Vec<Snowflake>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAppendedEvent {
    pub chat_id: Snowflake,
    pub message_id: Snowflake,
    pub sender_id: Snowflake,
    /// The message as clients render it
    pub message: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionToggledEvent {
    pub chat_id: Snowflake,
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    pub emoji: String,
    pub status: ReactionToggle,
    pub timestamp: DateTime<Utc>,
}

/// `{kind, chatId, payload}` as seen by real-time consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub kind: String,
    pub chat_id: Snowflake,
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reaction_event() -> DomainEvent {
        DomainEvent::ReactionToggled(ReactionToggledEvent {
            chat_id: Snowflake::new(7),
            message_id: Snowflake::new(8),
            user_id: Snowflake::new(9),
            emoji: "👍".to_string(),
            status: ReactionToggle::Added,
            timestamp: Utc::now(),
        })
    }

    #[test]
    fn test_kind_and_chat_id() {
        let event = reaction_event();
        assert_eq!(event.kind(), "REACTION_TOGGLED");
        assert_eq!(event.chat_id(), Snowflake::new(7));
    }

    #[test]
    fn test_tagged_serialization() {
        let json = serde_json::to_value(reaction_event()).unwrap();
        assert_eq!(json["type"], "REACTION_TOGGLED");
        assert_eq!(json["messageId"], "8");
        assert_eq!(json["status"], "added");
    }

    #[test]
    fn test_envelope() {
        let env = reaction_event().envelope();
        assert_eq!(env.kind, "REACTION_TOGGLED");
        assert_eq!(env.chat_id, Snowflake::new(7));
        assert_eq!(env.payload["emoji"], "👍");

        let wire = serde_json::to_value(&env).unwrap();
        assert_eq!(wire["chatId"], "7");
    }
}
