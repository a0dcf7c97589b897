//! Conversation service
//!
//! Shapes chats for one viewer: the chat list with unread counts, and the
//! detailed view returned when a chat is opened or created. Holds no state
//! of its own; all writes go through [`MembershipService`].

use std::collections::HashMap;

use messenger_core::entities::{Chat, MemberProfile, Message};
use messenger_core::{DomainError, Snowflake};
use tracing::instrument;
use validator::Validate;

use crate::dto::{
    AddMemberRequest, ChatDetailResponse, ChatSummaryResponse, ChatWithMembers,
    CreateGroupChatRequest, MemberResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::membership::{MembershipService, NewGroup};

/// Conversation service
pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    /// Create a new ConversationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Every chat the user belongs to, most recent first
    #[instrument(skip(self))]
    pub async fn list_chats_for_user(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<ChatSummaryResponse>> {
        let chats: Vec<Chat> = self
            .ctx
            .storage(self.ctx.chat_repo().find_by_member(user_id))
            .await?
            .into_iter()
            .map(|(chat, _)| chat)
            .collect();
        if chats.is_empty() {
            return Ok(Vec::new());
        }

        let chat_ids: Vec<Snowflake> = chats.iter().map(|c| c.id).collect();

        let mut members: HashMap<Snowflake, Vec<MemberProfile>> = HashMap::new();
        for profile in self
            .ctx
            .storage(self.ctx.chat_repo().find_members_with_users(&chat_ids))
            .await?
        {
            members.entry(profile.member.chat_id).or_default().push(profile);
        }

        let mut latest: HashMap<Snowflake, Message> = self
            .ctx
            .storage(self.ctx.message_repo().find_latest_by_chats(&chat_ids))
            .await?
            .into_iter()
            .map(|m| (m.chat_id, m))
            .collect();

        let unread = self
            .ctx
            .storage(self.ctx.message_repo().unread_counts(user_id))
            .await?;

        Ok(chats
            .into_iter()
            .map(|chat| {
                let id = chat.id;
                ChatWithMembers {
                    members: members.remove(&id).unwrap_or_default(),
                    latest: latest.remove(&id),
                    unread_count: unread.get(&id).copied().unwrap_or(0),
                    viewer_id: user_id,
                    chat,
                }
                .summary()
            })
            .collect())
    }

    /// Open (creating if needed) the direct chat with `counterpart_id`
    ///
    /// Passing the caller's own id opens the self-chat.
    #[instrument(skip(self))]
    pub async fn open_direct_chat(
        &self,
        requester_id: Snowflake,
        counterpart_id: Option<Snowflake>,
    ) -> ServiceResult<ChatDetailResponse> {
        let counterpart_id = counterpart_id.ok_or(DomainError::MissingField("otherUserId"))?;

        let (chat, _) = MembershipService::new(self.ctx)
            .get_or_create_direct_chat(requester_id, counterpart_id)
            .await?;

        self.view(chat, requester_id).await.map(ChatDetailResponse::from)
    }

    /// Create a group owned by the caller
    #[instrument(skip(self, request))]
    pub async fn create_group(
        &self,
        owner_id: Snowflake,
        request: CreateGroupChatRequest,
    ) -> ServiceResult<ChatDetailResponse> {
        request.validate()?;

        let (chat, _) = MembershipService::new(self.ctx)
            .create_group_chat(
                owner_id,
                NewGroup {
                    name: request.name,
                    member_ids: request.members,
                    description: request.description,
                    avatar: request.avatar,
                },
            )
            .await?;

        self.view(chat, owner_id).await.map(ChatDetailResponse::from)
    }

    #[instrument(skip(self, request))]
    pub async fn add_member(
        &self,
        chat_id: Snowflake,
        actor_id: Snowflake,
        request: AddMemberRequest,
    ) -> ServiceResult<MemberResponse> {
        request.validate()?;
        let user_id = request.user_id.ok_or(DomainError::MissingField("userId"))?;

        let member = MembershipService::new(self.ctx)
            .add_member(chat_id, actor_id, user_id)
            .await?;

        Ok(MemberResponse::from(&member))
    }

    pub async fn mark_read(&self, chat_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        MembershipService::new(self.ctx)
            .mark_read(chat_id, user_id)
            .await
            .map(|_| ())
    }

    /// One chat as `viewer_id` sees it, with members and the latest message
    async fn view(&self, chat: Chat, viewer_id: Snowflake) -> ServiceResult<ChatWithMembers> {
        let ids = [chat.id];
        let members = self
            .ctx
            .storage(self.ctx.chat_repo().find_members_with_users(&ids))
            .await?;
        let latest = self
            .ctx
            .storage(self.ctx.message_repo().find_latest_by_chats(&ids))
            .await?
            .into_iter()
            .next();
        let unread_count = if latest.is_some() {
            self.ctx
                .storage(self.ctx.message_repo().unread_counts(viewer_id))
                .await?
                .get(&chat.id)
                .copied()
                .unwrap_or(0)
        } else {
            0
        };

        Ok(ChatWithMembers {
            chat,
            viewer_id,
            members,
            latest,
            unread_count,
        })
    }
}
