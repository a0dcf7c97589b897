//! Canonical member-set key for direct chats

use std::fmt;

use super::snowflake::{Snowflake, SnowflakeParseError};

/// Unordered pair of participants of a direct chat.
///
/// `(a, b)` and `(b, a)` produce the same key; `(u, u)` is the self-chat.
/// The string form `"{low}:{high}"` is what storage keeps unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectChatKey {
    low: Snowflake,
    high: Snowflake,
}

impl DirectChatKey {
    pub fn new(a: Snowflake, b: Snowflake) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn self_chat(user_id: Snowflake) -> Self {
        Self {
            low: user_id,
            high: user_id,
        }
    }

    #[inline]
    pub fn is_self_chat(&self) -> bool {
        self.low == self.high
    }

    /// Distinct participants (one for the self-chat)
    pub fn participants(&self) -> Vec<Snowflake> {
        if self.is_self_chat() {
            vec![self.low]
        } else {
            vec![self.low, self.high]
        }
    }

    pub fn contains(&self, user_id: Snowflake) -> bool {
        self.low == user_id || self.high == user_id
    }

    /// The participant that is not `user_id`, or `user_id` itself for the self-chat
    pub fn counterpart_of(&self, user_id: Snowflake) -> Option<Snowflake> {
        if self.low == user_id {
            Some(self.high)
        } else if self.high == user_id {
            Some(self.low)
        } else {
            None
        }
    }

    pub fn as_key(&self) -> String {
        self.to_string()
    }

    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        let (low, high) = s
            .split_once(':')
            .ok_or_else(|| SnowflakeParseError::InvalidFormat(s.to_string()))?;
        Ok(Self::new(Snowflake::parse(low)?, Snowflake::parse(high)?))
    }
}

impl fmt::Display for DirectChatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}
