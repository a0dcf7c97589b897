//! In-memory implementation of every repository trait
//!
//! Backs local runs without `DATABASE_URL` and the service test suites. All
//! tables sit behind one `RwLock`; every trait method takes the lock once and
//! never across an await, so each call is atomic the way a single SQL
//! transaction is.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::instrument;

use messenger_core::entities::{
    Attachment, Chat, ChatMember, MemberProfile, Message, Reaction, ReactionToggle, User,
};
use messenger_core::error::DomainError;
use messenger_core::traits::{
    ChatRepository, MessageQuery, MessageRepository, ReactionRepository, RepoResult,
    UserRepository, MAX_MESSAGE_PAGE,
};
use messenger_core::value_objects::{DirectChatKey, Snowflake};

type ReactionKey = (Snowflake, Snowflake, String);

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Snowflake, User>,
    users_by_external: HashMap<String, Snowflake>,
    chats: HashMap<Snowflake, Chat>,
    direct_chats: HashMap<DirectChatKey, Snowflake>,
    /// keyed (chat_id, user_id)
    members: BTreeMap<(Snowflake, Snowflake), ChatMember>,
    messages: HashMap<Snowflake, Message>,
    attachments: BTreeMap<Snowflake, Vec<Attachment>>,
    reactions: BTreeMap<ReactionKey, Reaction>,
}

impl Tables {
    fn insert_members(&mut self, members: &[ChatMember]) -> RepoResult<()> {
        if members
            .iter()
            .any(|m| self.members.contains_key(&(m.chat_id, m.user_id)))
        {
            return Err(DomainError::AlreadyMember);
        }
        for m in members {
            self.members.insert((m.chat_id, m.user_id), m.clone());
        }
        Ok(())
    }

    fn messages_of(&self, chat_id: Snowflake) -> Vec<&Message> {
        let mut messages: Vec<&Message> = self
            .messages
            .values()
            .filter(|m| m.chat_id == chat_id)
            .collect();
        messages.sort_by_key(|m| (m.created_at, m.id));
        messages
    }
}

/// Shared in-process store; clones see the same tables
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chats, for assertions
    pub fn chat_count(&self) -> usize {
        self.tables.read().chats.len()
    }

    /// Number of stored reaction triples, for assertions
    pub fn reaction_count(&self) -> usize {
        self.tables.read().reactions.len()
    }
}

// ============================================================================
// Users
// ============================================================================

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>> {
        let tables = self.tables.read();
        Ok(ids.iter().filter_map(|id| tables.users.get(id).cloned()).collect())
    }

    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<User>> {
        let tables = self.tables.read();
        Ok(tables
            .users_by_external
            .get(external_id)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    #[instrument(skip(self, user), fields(external_id = %user.external_id))]
    async fn create_or_get(&self, user: &User) -> RepoResult<User> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables
            .users_by_external
            .get(&user.external_id)
            .and_then(|id| tables.users.get(id))
        {
            return Ok(existing.clone());
        }
        if tables.users.contains_key(&user.id) {
            return Err(DomainError::UniqueViolation("users_pkey".to_string()));
        }
        tables
            .users_by_external
            .insert(user.external_id.clone(), user.id);
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn list_except(&self, user_id: Snowflake, limit: i64) -> RepoResult<Vec<User>> {
        let limit = usize::try_from(limit.clamp(1, 100)).unwrap_or(100);
        let tables = self.tables.read();
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| u.id != user_id)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        users.truncate(limit);
        Ok(users)
    }
}

// ============================================================================
// Chats
// ============================================================================

#[async_trait]
impl ChatRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>> {
        Ok(self.tables.read().chats.get(&id).cloned())
    }

    async fn find_direct(&self, key: &DirectChatKey) -> RepoResult<Option<Chat>> {
        let tables = self.tables.read();
        Ok(tables
            .direct_chats
            .get(key)
            .and_then(|id| tables.chats.get(id))
            .cloned())
    }

    #[instrument(skip(self, chat, members), fields(chat_id = %chat.id))]
    async fn get_or_create_direct(
        &self,
        chat: &Chat,
        members: &[ChatMember],
    ) -> RepoResult<(Chat, bool)> {
        let key = chat
            .direct_key
            .ok_or_else(|| DomainError::InternalError("direct chat without key".to_string()))?;

        let mut tables = self.tables.write();
        if let Some(existing) = tables
            .direct_chats
            .get(&key)
            .and_then(|id| tables.chats.get(id))
        {
            return Ok((existing.clone(), false));
        }

        tables.insert_members(members)?;
        tables.direct_chats.insert(key, chat.id);
        tables.chats.insert(chat.id, chat.clone());
        Ok((chat.clone(), true))
    }

    #[instrument(skip(self, chat, members), fields(chat_id = %chat.id))]
    async fn create_with_members(&self, chat: &Chat, members: &[ChatMember]) -> RepoResult<()> {
        let mut tables = self.tables.write();
        if tables.chats.contains_key(&chat.id) {
            return Err(DomainError::UniqueViolation(format!(
                "chat {} already exists",
                chat.id
            )));
        }
        tables.insert_members(members)?;
        tables.chats.insert(chat.id, chat.clone());
        Ok(())
    }

    async fn find_member(
        &self,
        chat_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<ChatMember>> {
        Ok(self.tables.read().members.get(&(chat_id, user_id)).cloned())
    }

    async fn find_members(&self, chat_id: Snowflake) -> RepoResult<Vec<ChatMember>> {
        let tables = self.tables.read();
        let mut members: Vec<ChatMember> = tables
            .members
            .range((chat_id, Snowflake::new(i64::MIN))..=(chat_id, Snowflake::new(i64::MAX)))
            .map(|(_, m)| m.clone())
            .collect();
        members.sort_by_key(|m| (m.joined_at, m.user_id));
        Ok(members)
    }

    async fn find_members_with_users(
        &self,
        chat_ids: &[Snowflake],
    ) -> RepoResult<Vec<MemberProfile>> {
        let tables = self.tables.read();
        let mut profiles: Vec<MemberProfile> = tables
            .members
            .values()
            .filter(|m| chat_ids.contains(&m.chat_id))
            .filter_map(|m| {
                tables.users.get(&m.user_id).map(|u| MemberProfile {
                    member: m.clone(),
                    user: u.clone(),
                })
            })
            .collect();
        profiles.sort_by_key(|p| (p.member.chat_id, p.member.joined_at, p.member.user_id));
        Ok(profiles)
    }

    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<(Chat, ChatMember)>> {
        let tables = self.tables.read();
        let mut rows: Vec<(Chat, ChatMember)> = tables
            .members
            .values()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| tables.chats.get(&m.chat_id).map(|c| (c.clone(), m.clone())))
            .collect();
        rows.sort_by(|(a, _), (b, _)| b.recency().cmp(&a.recency()).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn add_member(&self, member: &ChatMember) -> RepoResult<()> {
        let mut tables = self.tables.write();
        if !tables.chats.contains_key(&member.chat_id) {
            return Err(DomainError::ChatNotFound(member.chat_id));
        }
        tables.insert_members(std::slice::from_ref(member))
    }

    async fn update_last_read(
        &self,
        chat_id: Snowflake,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<ChatMember>> {
        let mut tables = self.tables.write();
        Ok(tables.members.get_mut(&(chat_id, user_id)).map(|m| {
            if m.last_read_at.is_none_or(|read| read < at) {
                m.last_read_at = Some(at);
            }
            m.clone()
        }))
    }
}

// ============================================================================
// Messages
// ============================================================================

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.tables.read().messages.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Message>> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.messages.get(id).cloned())
            .collect())
    }

    #[instrument(skip(self, message, attachments), fields(message_id = %message.id))]
    async fn append(
        &self,
        mut message: Message,
        attachments: &[Attachment],
    ) -> RepoResult<Message> {
        let mut tables = self.tables.write();
        let chat = tables
            .chats
            .get_mut(&message.chat_id)
            .ok_or(DomainError::ChatNotFound(message.chat_id))?;
        message.created_at = Utc::now();
        chat.touch(message.created_at);

        if !attachments.is_empty() {
            tables.attachments.insert(message.id, attachments.to_vec());
        }
        tables.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn find_by_chat(
        &self,
        chat_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        let tables = self.tables.read();
        let mut window = tables.messages_of(chat_id);

        if let Some(before) = query.before {
            let Some(cursor) = tables.messages.get(&before) else {
                return Ok(Vec::new());
            };
            let cursor = (cursor.created_at, cursor.id);
            window.retain(|m| (m.created_at, m.id) < cursor);
        }
        if let Some(limit) = query.limit {
            let limit = usize::try_from(limit.clamp(1, MAX_MESSAGE_PAGE)).unwrap_or(1);
            let skip = window.len().saturating_sub(limit);
            window.drain(..skip);
        }

        Ok(window.into_iter().cloned().collect())
    }

    async fn find_latest_by_chats(&self, chat_ids: &[Snowflake]) -> RepoResult<Vec<Message>> {
        let tables = self.tables.read();
        Ok(chat_ids
            .iter()
            .filter_map(|id| tables.messages_of(*id).last().map(|m| (*m).clone()))
            .collect())
    }

    async fn find_attachments(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<Attachment>> {
        let tables = self.tables.read();
        Ok(message_ids
            .iter()
            .filter_map(|id| tables.attachments.get(id))
            .flatten()
            .cloned()
            .collect())
    }

    async fn unread_counts(&self, user_id: Snowflake) -> RepoResult<HashMap<Snowflake, i64>> {
        let tables = self.tables.read();
        let mut counts = HashMap::new();

        for member in tables.members.values().filter(|m| m.user_id == user_id) {
            let unread = tables
                .messages
                .values()
                .filter(|msg| msg.chat_id == member.chat_id)
                .filter(|msg| member.is_unread(msg.sender_id, msg.created_at))
                .count();
            if unread > 0 {
                counts.insert(member.chat_id, i64::try_from(unread).unwrap_or(i64::MAX));
            }
        }

        Ok(counts)
    }
}

// ============================================================================
// Reactions
// ============================================================================

#[async_trait]
impl ReactionRepository for MemoryStore {
    async fn toggle(&self, reaction: &Reaction) -> RepoResult<ReactionToggle> {
        let key = (reaction.message_id, reaction.user_id, reaction.emoji.clone());
        let mut tables = self.tables.write();

        if tables.reactions.remove(&key).is_some() {
            Ok(ReactionToggle::Removed)
        } else {
            tables.reactions.insert(key, reaction.clone());
            Ok(ReactionToggle::Added)
        }
    }

    async fn find(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<Reaction>> {
        Ok(self
            .tables
            .read()
            .reactions
            .get(&(message_id, user_id, emoji.to_string()))
            .cloned())
    }

    async fn find_by_messages(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<Reaction>> {
        let tables = self.tables.read();
        let mut reactions: Vec<Reaction> = tables
            .reactions
            .values()
            .filter(|r| message_ids.contains(&r.message_id))
            .cloned()
            .collect();
        reactions.sort_by_key(|r| (r.message_id, r.created_at));
        Ok(reactions)
    }
}
