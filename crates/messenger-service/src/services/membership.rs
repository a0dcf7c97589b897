//! Membership service
//!
//! Owns chat creation and membership rules: one direct chat per unordered
//! pair of users (a single-member chat for the pair (u, u)), group creation,
//! member addition, and read markers.

use chrono::Utc;
use messenger_core::entities::{Chat, ChatMember, MemberRole};
use messenger_core::{ChatCreatedEvent, DirectChatKey, DomainError, DomainEvent, Snowflake};
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Validated input for a new group
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub member_ids: Vec<Snowflake>,
    pub description: Option<String>,
    pub avatar: Option<String>,
}

/// Membership service
pub struct MembershipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipService<'a> {
    /// Create a new MembershipService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// The caller's membership row, or `NotChatMember`
    pub async fn require_member(
        &self,
        chat_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<ChatMember> {
        self.ctx
            .storage(self.ctx.chat_repo().find_member(chat_id, user_id))
            .await?
            .ok_or_else(|| DomainError::NotChatMember(chat_id).into())
    }

    /// Return the direct chat between two users, creating it if needed
    ///
    /// The boolean is true when this call created the chat. Concurrent calls
    /// for the same pair, in either order, return the same chat.
    #[instrument(skip(self))]
    pub async fn get_or_create_direct_chat(
        &self,
        requester_id: Snowflake,
        counterpart_id: Snowflake,
    ) -> ServiceResult<(Chat, bool)> {
        let key = DirectChatKey::new(requester_id, counterpart_id);

        if !key.is_self_chat()
            && self
                .ctx
                .storage(self.ctx.user_repo().find_by_id(counterpart_id))
                .await?
                .is_none()
        {
            return Err(DomainError::CounterpartNotFound.into());
        }

        // Read-only fast path
        if let Some(existing) = self.ctx.storage(self.ctx.chat_repo().find_direct(&key)).await? {
            debug!(chat_id = %existing.id, "direct chat already exists");
            return Ok((existing, false));
        }

        let chat = Chat::direct(self.ctx.generate_id(), key);
        let members = if key.is_self_chat() {
            vec![ChatMember::new(chat.id, requester_id, MemberRole::Owner)]
        } else {
            vec![
                ChatMember::new(chat.id, requester_id, MemberRole::Owner),
                ChatMember::new(chat.id, counterpart_id, MemberRole::Member),
            ]
        };

        let (chat, created) = self
            .ctx
            .storage(self.ctx.chat_repo().get_or_create_direct(&chat, &members))
            .await?;

        if created {
            info!(chat_id = %chat.id, self_chat = key.is_self_chat(), "Direct chat created");
            self.publish_created(&chat, key.participants()).await;
        }

        Ok((chat, created))
    }

    /// Create a group owned by `owner_id`
    ///
    /// The owner is always a member exactly once, whether or not the
    /// requested member list names them.
    #[instrument(skip(self, group), fields(member_count = group.member_ids.len()))]
    pub async fn create_group_chat(
        &self,
        owner_id: Snowflake,
        group: NewGroup,
    ) -> ServiceResult<(Chat, Vec<ChatMember>)> {
        let name = group.name.trim();
        if name.is_empty() {
            return Err(DomainError::MissingField("name").into());
        }

        let mut member_ids: Vec<Snowflake> = Vec::with_capacity(group.member_ids.len());
        for id in group.member_ids {
            if id != owner_id && !member_ids.contains(&id) {
                member_ids.push(id);
            }
        }
        if member_ids.is_empty() {
            return Err(DomainError::MissingField("members").into());
        }

        let known = self
            .ctx
            .storage(self.ctx.user_repo().find_by_ids(&member_ids))
            .await?;
        if let Some(missing) = member_ids
            .iter()
            .find(|id| !known.iter().any(|u| u.id == **id))
        {
            return Err(DomainError::UnknownMember(*missing).into());
        }

        let chat = Chat::group(
            self.ctx.generate_id(),
            name.to_string(),
            group.description.filter(|d| !d.trim().is_empty()),
            group.avatar.filter(|a| !a.trim().is_empty()),
        );
        let owner = ChatMember::new(chat.id, owner_id, MemberRole::Owner);
        let members: Vec<ChatMember> = std::iter::once(owner)
            .chain(
                member_ids
                    .iter()
                    .map(|id| ChatMember::new(chat.id, *id, MemberRole::Member)),
            )
            .collect();

        self.ctx
            .storage(self.ctx.chat_repo().create_with_members(&chat, &members))
            .await?;

        info!(chat_id = %chat.id, owner_id = %owner_id, "Group chat created");
        self.publish_created(&chat, members.iter().map(|m| m.user_id).collect())
            .await;

        Ok((chat, members))
    }

    /// Add `user_id` to a group; the actor must be an owner or admin
    #[instrument(skip(self))]
    pub async fn add_member(
        &self,
        chat_id: Snowflake,
        actor_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<ChatMember> {
        let actor = self.require_member(chat_id, actor_id).await?;

        let chat = self
            .ctx
            .storage(self.ctx.chat_repo().find_by_id(chat_id))
            .await?
            .ok_or(DomainError::ChatNotFound(chat_id))?;
        if chat.is_direct() {
            return Err(DomainError::NotAGroupChat.into());
        }
        if !actor.role.can_manage_members() {
            return Err(DomainError::InsufficientChatRole.into());
        }

        if self
            .ctx
            .storage(self.ctx.user_repo().find_by_id(user_id))
            .await?
            .is_none()
        {
            return Err(DomainError::UnknownMember(user_id).into());
        }

        let member = ChatMember::new(chat_id, user_id, MemberRole::Member);
        self.ctx
            .storage(self.ctx.chat_repo().add_member(&member))
            .await?;

        info!(chat_id = %chat_id, user_id = %user_id, "Member added");
        Ok(member)
    }

    /// Move the caller's read marker to now (never backwards)
    ///
    /// Non-members get `ChatNotFound`, as message listing does.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        chat_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<ChatMember> {
        self.ctx
            .storage(self.ctx.chat_repo().update_last_read(chat_id, user_id, Utc::now()))
            .await?
            .ok_or_else(|| DomainError::ChatNotFound(chat_id).into())
    }

    async fn publish_created(&self, chat: &Chat, member_ids: Vec<Snowflake>) {
        self.ctx
            .publish(DomainEvent::ChatCreated(ChatCreatedEvent {
                chat_id: chat.id,
                chat_type: chat.chat_type,
                member_ids,
                timestamp: chat.created_at,
            }))
            .await;
    }
}
