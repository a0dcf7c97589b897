//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL or in-memory).

use std::collections::HashMap;

use async_trait::async_trait;

use crate::entities::{
    Attachment, Chat, ChatMember, MemberProfile, Message, Reaction, ReactionToggle, User,
};
use crate::error::DomainError;
use crate::value_objects::{DirectChatKey, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>>;

    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<User>>;

    /// Insert `user` unless a user with the same external id exists.
    /// Returns the stored row either way.
    async fn create_or_get(&self, user: &User) -> RepoResult<User>;

    /// Everyone except `user_id`, ordered by name
    async fn list_except(&self, user_id: Snowflake, limit: i64) -> RepoResult<Vec<User>>;
}

// ============================================================================
// Chat Repository
// ============================================================================

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>>;

    async fn find_direct(&self, key: &DirectChatKey) -> RepoResult<Option<Chat>>;

    /// Create the direct chat described by `chat` and `members` unless one with
    /// the same key already exists. The existence re-check and the insert run
    /// as one atomic unit. Returns the chat that exists afterwards and whether
    /// this call created it.
    async fn get_or_create_direct(
        &self,
        chat: &Chat,
        members: &[ChatMember],
    ) -> RepoResult<(Chat, bool)>;

    /// Insert a chat together with its member rows, all or nothing
    async fn create_with_members(&self, chat: &Chat, members: &[ChatMember]) -> RepoResult<()>;

    async fn find_member(
        &self,
        chat_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<ChatMember>>;

    async fn find_members(&self, chat_id: Snowflake) -> RepoResult<Vec<ChatMember>>;

    /// Members of every chat in `chat_ids`, joined with their user rows
    async fn find_members_with_users(
        &self,
        chat_ids: &[Snowflake],
    ) -> RepoResult<Vec<MemberProfile>>;

    /// Chats `user_id` belongs to with the caller's own membership row,
    /// most recent first (`COALESCE(last_message_at, created_at) DESC, id DESC`)
    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<(Chat, ChatMember)>>;

    /// Fails with `AlreadyMember` if the pair exists
    async fn add_member(&self, member: &ChatMember) -> RepoResult<()>;

    /// Set `last_read_at = max(last_read_at, at)`; returns the updated row
    async fn update_last_read(
        &self,
        chat_id: Snowflake,
        user_id: Snowflake,
        at: chrono::DateTime<chrono::Utc>,
    ) -> RepoResult<Option<ChatMember>>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Largest page `find_by_chat` serves when a limit is given
pub const MAX_MESSAGE_PAGE: i64 = 200;

/// Optional cursor window for message listing
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageQuery {
    /// Only messages strictly older than this one
    pub before: Option<Snowflake>,
    /// The newest `limit` messages of the window; `None` means all
    pub limit: Option<i64>,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Message>>;

    /// Insert the message with its attachments atomically, then move the
    /// chat's `last_message_at` forward inside the same unit of work.
    ///
    /// `created_at` is stamped by the store once it holds the chat's write
    /// lock, so no read marker can fall between the stamp and visibility.
    /// Returns the message as stored.
    async fn append(&self, message: Message, attachments: &[Attachment]) -> RepoResult<Message>;

    /// Ascending `(created_at, id)`
    async fn find_by_chat(&self, chat_id: Snowflake, query: MessageQuery)
        -> RepoResult<Vec<Message>>;

    /// Newest message of each chat that has one
    async fn find_latest_by_chats(&self, chat_ids: &[Snowflake]) -> RepoResult<Vec<Message>>;

    async fn find_attachments(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<Attachment>>;

    /// Per chat: messages from others newer than the member's `last_read_at`
    /// (all of them while it is unset). Chats with zero unread are omitted.
    async fn unread_counts(&self, user_id: Snowflake) -> RepoResult<HashMap<Snowflake, i64>>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Flip the (message, user, emoji) triple. Calls for the same triple are
    /// serialized so the outcome tracks call-count parity.
    async fn toggle(&self, reaction: &Reaction) -> RepoResult<ReactionToggle>;

    async fn find(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<Reaction>>;

    async fn find_by_messages(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<Reaction>>;
}
