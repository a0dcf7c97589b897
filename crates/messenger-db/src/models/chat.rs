//! Chat database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for chats table
#[derive(Debug, Clone, FromRow)]
pub struct ChatModel {
    pub id: i64,
    /// 'direct', 'group' or 'channel' (stored as PostgreSQL enum)
    #[sqlx(rename = "type")]
    pub chat_type: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
    pub direct_key: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ChatModel {
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.chat_type == "direct"
    }
}
