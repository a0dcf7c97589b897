//! Reaction entity - one (message, user, emoji) triple

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(message_id: Snowflake, user_id: Snowflake, emoji: impl Into<String>) -> Self {
        Self {
            message_id,
            user_id,
            emoji: emoji.into(),
            created_at: Utc::now(),
        }
    }

    pub fn same_triple(&self, other: &Self) -> bool {
        self.message_id == other.message_id
            && self.user_id == other.user_id
            && self.emoji == other.emoji
    }
}

/// Outcome of flipping a reaction triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionToggle {
    Added,
    Removed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_triple_ignores_timestamp() {
        let a = Reaction::new(Snowflake::new(1), Snowflake::new(2), "👍");
        let mut b = a.clone();
        b.created_at = a.created_at + chrono::Duration::seconds(3);
        assert!(a.same_triple(&b));

        let c = Reaction::new(Snowflake::new(1), Snowflake::new(2), "🔥");
        assert!(!a.same_triple(&c));
    }

    #[test]
    fn test_toggle_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ReactionToggle::Added).unwrap(), "\"added\"");
        assert_eq!(serde_json::to_string(&ReactionToggle::Removed).unwrap(), "\"removed\"");
    }
}
