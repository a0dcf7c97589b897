//! Reaction service

use messenger_core::entities::Reaction;
use messenger_core::{DomainError, DomainEvent, ReactionToggle, ReactionToggledEvent, Snowflake};
use tracing::{info, instrument};

use crate::dto::{ReactionResponse, ToggleReactionResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::membership::MembershipService;

/// Longest emoji string accepted, in characters
pub const MAX_EMOJI_LENGTH: usize = 64;

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Flip the caller's `emoji` reaction on a message
    ///
    /// Each call inverts the previous state of the (message, user, emoji)
    /// triple; concurrent calls resolve in call-count parity.
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> ServiceResult<ToggleReactionResponse> {
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(DomainError::MissingField("emoji").into());
        }
        if emoji.chars().count() > MAX_EMOJI_LENGTH {
            return Err(ServiceError::validation(format!(
                "emoji must be at most {MAX_EMOJI_LENGTH} characters"
            )));
        }

        let message = self
            .ctx
            .storage(self.ctx.message_repo().find_by_id(message_id))
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?;

        MembershipService::new(self.ctx)
            .require_member(message.chat_id, user_id)
            .await?;

        let reaction = Reaction::new(message_id, user_id, emoji);
        let status = self
            .ctx
            .storage(self.ctx.reaction_repo().toggle(&reaction))
            .await?;

        info!(message_id = %message_id, user_id = %user_id, status = ?status, "Reaction toggled");

        self.ctx
            .publish(DomainEvent::ReactionToggled(ReactionToggledEvent {
                chat_id: message.chat_id,
                message_id,
                user_id,
                emoji: reaction.emoji.clone(),
                status,
                timestamp: reaction.created_at,
            }))
            .await;

        Ok(ToggleReactionResponse {
            status,
            reaction: match status {
                ReactionToggle::Added => Some(ReactionResponse::from(&reaction)),
                ReactionToggle::Removed => None,
            },
        })
    }
}
