//! Member database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::ChatModel;

/// Database model for chat_members table
#[derive(Debug, Clone, FromRow)]
pub struct ChatMemberModel {
    pub chat_id: i64,
    pub user_id: i64,
    pub role: String,
    pub joined_at: DateTime<Utc>,
    pub last_read_at: Option<DateTime<Utc>>,
}

/// Member row joined with its user (columns prefixed `user_`)
#[derive(Debug, Clone, FromRow)]
pub struct MemberWithUserModel {
    pub chat_id: i64,
    pub user_id: i64,
    pub role: String,
    pub joined_at: DateTime<Utc>,
    pub last_read_at: Option<DateTime<Utc>>,
    pub user_external_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_avatar: Option<String>,
    pub user_is_online: bool,
    pub user_created_at: DateTime<Utc>,
    pub user_updated_at: DateTime<Utc>,
}

/// A chat row joined with the caller's membership (member columns prefixed `m_`)
#[derive(Debug, Clone, FromRow)]
pub struct ChatWithMemberModel {
    #[sqlx(flatten)]
    pub chat: ChatModel,
    pub m_user_id: i64,
    pub m_role: String,
    pub m_joined_at: DateTime<Utc>,
    pub m_last_read_at: Option<DateTime<Utc>>,
}
