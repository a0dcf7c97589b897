//! Message service
//!
//! Appends messages to chats and pages through a chat's history, hydrating
//! each message with its sender, attachments, reactions and reply preview.

use std::collections::{HashMap, HashSet};

use messenger_core::entities::{Attachment, Message, Reaction, User};
use messenger_core::{
    DomainError, DomainEvent, MessageAppendedEvent, MessageQuery, Snowflake, FALLBACK_USER_NAME,
};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{
    ListMessagesQuery, MessageResponse, MessageWithDetails, ReplyPreview, SendMessageRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::membership::MembershipService;

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Append a message as `sender_id`
    ///
    /// The message, its attachments and the chat's recency commit together.
    /// Whitespace-only text counts as no text.
    #[instrument(skip(self, request), fields(chat_id = ?request.chat_id))]
    pub async fn append(
        &self,
        sender_id: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        request.validate()?;
        let chat_id = request.chat_id.ok_or(DomainError::MissingField("chatId"))?;

        MembershipService::new(self.ctx)
            .require_member(chat_id, sender_id)
            .await?;

        let text = request.text.filter(|t| !t.trim().is_empty());
        if text.is_none() && request.attachments.is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }

        let reply_to = match request.reply_to_id {
            Some(reply_id) => Some(self.reply_target(chat_id, reply_id).await?),
            None => None,
        };

        let mut message = Message::new(self.ctx.generate_id(), chat_id, sender_id);
        message.text = text;
        message.message_type = request.message_type;
        message.reply_to_id = reply_to.as_ref().map(|r| r.id);

        let attachments: Vec<Attachment> = request
            .attachments
            .into_iter()
            .map(|a| Attachment {
                id: self.ctx.generate_id(),
                message_id: message.id,
                url: a.url,
                name: a.name,
                size: a.size,
                mime_type: a.mime_type,
            })
            .collect();

        let message = self
            .ctx
            .storage(self.ctx.message_repo().append(message, &attachments))
            .await?;

        info!(
            message_id = %message.id,
            sender_id = %sender_id,
            attachments = attachments.len(),
            "Message appended"
        );

        let sender = self
            .ctx
            .storage(self.ctx.user_repo().find_by_id(sender_id))
            .await?;
        let reply_preview = match reply_to {
            Some(target) => Some(self.preview(target).await?),
            None => None,
        };

        let response = MessageResponse::from(MessageWithDetails {
            message: message.clone(),
            sender,
            attachments,
            reactions: Vec::new(),
            reply_to: reply_preview,
        });

        let payload = match serde_json::to_value(&response) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Message payload did not serialize");
                serde_json::Value::Null
            }
        };
        self.ctx
            .publish(DomainEvent::MessageAppended(MessageAppendedEvent {
                chat_id,
                message_id: message.id,
                sender_id,
                message: payload,
                timestamp: message.created_at,
            }))
            .await;

        Ok(response)
    }

    /// Messages of one chat, oldest first
    ///
    /// Non-members see `ChatNotFound` so chat ids do not leak.
    #[instrument(skip(self))]
    pub async fn list_for_chat(
        &self,
        chat_id: Snowflake,
        requester_id: Snowflake,
        query: ListMessagesQuery,
    ) -> ServiceResult<Vec<MessageResponse>> {
        query.validate()?;

        let membership = self
            .ctx
            .storage(self.ctx.chat_repo().find_member(chat_id, requester_id))
            .await?;
        if membership.is_none() {
            return Err(DomainError::ChatNotFound(chat_id).into());
        }

        let messages = self
            .ctx
            .storage(self.ctx.message_repo().find_by_chat(
                chat_id,
                MessageQuery {
                    before: query.before,
                    limit: query.limit,
                },
            ))
            .await?;

        self.hydrate(messages).await
    }

    /// The reply target, which must belong to the same chat
    async fn reply_target(
        &self,
        chat_id: Snowflake,
        reply_id: Snowflake,
    ) -> ServiceResult<Message> {
        self.ctx
            .storage(self.ctx.message_repo().find_by_id(reply_id))
            .await?
            .filter(|target| target.chat_id == chat_id)
            .ok_or_else(|| DomainError::InvalidReplyTarget.into())
    }

    async fn preview(&self, target: Message) -> ServiceResult<ReplyPreview> {
        let sender_name = self
            .ctx
            .storage(self.ctx.user_repo().find_by_id(target.sender_id))
            .await?
            .map_or_else(|| FALLBACK_USER_NAME.to_string(), |u| u.name);

        Ok(ReplyPreview {
            id: target.id,
            text: target.text,
            sender_name,
        })
    }

    /// Batch-load everything the page renders: one query per relation
    async fn hydrate(&self, messages: Vec<Message>) -> ServiceResult<Vec<MessageResponse>> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let message_ids: Vec<Snowflake> = messages.iter().map(|m| m.id).collect();

        // Reply targets outside the page are fetched separately
        let reply_ids: HashSet<Snowflake> = messages.iter().filter_map(|m| m.reply_to_id).collect();
        let mut targets: HashMap<Snowflake, Message> = messages
            .iter()
            .filter(|m| reply_ids.contains(&m.id))
            .map(|m| (m.id, m.clone()))
            .collect();
        let outside: Vec<Snowflake> = reply_ids
            .into_iter()
            .filter(|id| !targets.contains_key(id))
            .collect();
        if !outside.is_empty() {
            let fetched = self
                .ctx
                .storage(self.ctx.message_repo().find_by_ids(&outside))
                .await?;
            targets.extend(fetched.into_iter().map(|m| (m.id, m)));
        }

        let user_ids: Vec<Snowflake> = messages
            .iter()
            .map(|m| m.sender_id)
            .chain(targets.values().map(|m| m.sender_id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let users: HashMap<Snowflake, User> = self
            .ctx
            .storage(self.ctx.user_repo().find_by_ids(&user_ids))
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut attachments: HashMap<Snowflake, Vec<Attachment>> = HashMap::new();
        for attachment in self
            .ctx
            .storage(self.ctx.message_repo().find_attachments(&message_ids))
            .await?
        {
            attachments.entry(attachment.message_id).or_default().push(attachment);
        }

        let mut reactions: HashMap<Snowflake, Vec<Reaction>> = HashMap::new();
        for reaction in self
            .ctx
            .storage(self.ctx.reaction_repo().find_by_messages(&message_ids))
            .await?
        {
            reactions.entry(reaction.message_id).or_default().push(reaction);
        }

        Ok(messages
            .into_iter()
            .map(|message| {
                let reply_to = message
                    .reply_to_id
                    .and_then(|id| targets.get(&id))
                    .map(|target| ReplyPreview {
                        id: target.id,
                        text: target.text.clone(),
                        sender_name: users
                            .get(&target.sender_id)
                            .map_or_else(|| FALLBACK_USER_NAME.to_string(), |u| u.name.clone()),
                    });

                MessageResponse::from(MessageWithDetails {
                    sender: users.get(&message.sender_id).cloned(),
                    attachments: attachments.remove(&message.id).unwrap_or_default(),
                    reactions: reactions.remove(&message.id).unwrap_or_default(),
                    reply_to,
                    message,
                })
            })
            .collect())
    }
}
