//! Message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub text: Option<String>,
    #[sqlx(rename = "type")]
    pub message_type: String,
    pub reply_to_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl MessageModel {
    /// Check if message is a reply
    #[inline]
    pub fn is_reply(&self) -> bool {
        self.reply_to_id.is_some()
    }
}

/// Database model for attachments table
#[derive(Debug, Clone, FromRow)]
pub struct AttachmentModel {
    pub id: i64,
    pub message_id: i64,
    pub url: String,
    pub name: String,
    pub size: i64,
    pub mime_type: String,
}

/// Per-chat unread tally (from query)
#[derive(Debug, Clone, FromRow)]
pub struct UnreadCountModel {
    pub chat_id: i64,
    pub unread: i64,
}
