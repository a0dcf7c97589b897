//! Message, attachment and reaction entity <-> model mappers

use messenger_core::entities::{Attachment, Message, MessageType, Reaction};
use messenger_core::error::DomainError;
use messenger_core::value_objects::Snowflake;

use super::corrupt_row;
use crate::models::{AttachmentModel, MessageModel, ReactionModel};

impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        Ok(Message {
            id: Snowflake::new(model.id),
            chat_id: Snowflake::new(model.chat_id),
            sender_id: Snowflake::new(model.sender_id),
            text: model.text,
            message_type: model.message_type.parse::<MessageType>().map_err(corrupt_row)?,
            reply_to_id: model.reply_to_id.map(Snowflake::new),
            created_at: model.created_at,
        })
    }
}

impl From<AttachmentModel> for Attachment {
    fn from(model: AttachmentModel) -> Self {
        Attachment {
            id: Snowflake::new(model.id),
            message_id: Snowflake::new(model.message_id),
            url: model.url,
            name: model.name,
            size: model.size,
            mime_type: model.mime_type,
        }
    }
}

impl From<ReactionModel> for Reaction {
    fn from(model: ReactionModel) -> Self {
        Reaction {
            message_id: Snowflake::new(model.message_id),
            user_id: Snowflake::new(model.user_id),
            emoji: model.emoji,
            created_at: model.created_at,
        }
    }
}

/// Convert Message entity reference to values for database insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub text: Option<&'a str>,
    pub message_type: &'static str,
    pub reply_to_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id.into_inner(),
            chat_id: message.chat_id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            text: message.text.as_deref(),
            message_type: message.message_type.as_str(),
            reply_to_id: message.reply_to_id.map(Snowflake::into_inner),
            created_at: message.created_at,
        }
    }
}
