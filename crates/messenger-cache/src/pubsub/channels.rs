//! Pub/Sub channel definitions.
//!
//! Defines the channel naming conventions for Redis Pub/Sub.

use messenger_core::Snowflake;

/// Channel prefix for chat events (all members of one chat)
pub const CHAT_CHANNEL_PREFIX: &str = "chat:";
/// Channel prefix for user-specific events
pub const USER_CHANNEL_PREFIX: &str = "user:";

/// Pub/Sub channel types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Events for a specific chat
    Chat(Snowflake),
    /// Events for a specific user (all their sessions)
    User(Snowflake),
}

impl PubSubChannel {
    #[must_use]
    pub fn chat(chat_id: Snowflake) -> Self {
        Self::Chat(chat_id)
    }

    #[must_use]
    pub fn user(user_id: Snowflake) -> Self {
        Self::User(user_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Chat(id) => format!("{CHAT_CHANNEL_PREFIX}{id}"),
            Self::User(id) => format!("{USER_CHANNEL_PREFIX}{id}"),
        }
    }

    /// Parse a channel name back to a `PubSubChannel`
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(id) = name.strip_prefix(CHAT_CHANNEL_PREFIX) {
            return Snowflake::parse(id).ok().map(Self::Chat);
        }
        if let Some(id) = name.strip_prefix(USER_CHANNEL_PREFIX) {
            return Snowflake::parse(id).ok().map(Self::User);
        }
        None
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
