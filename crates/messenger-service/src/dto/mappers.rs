//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs, plus
//! the helper structs services fill before shaping a response.

use messenger_core::entities::{
    Attachment, Chat, ChatMember, MemberProfile, Message, Reaction, User,
};
use messenger_core::Snowflake;

use super::responses::{
    AttachmentResponse, ChatDetailResponse, ChatSummaryResponse, LastMessageResponse,
    MemberResponse, MessageResponse, PeerResponse, ReactionResponse, ReplyPreviewResponse,
    UserResponse, UserSummaryResponse, SAVED_MESSAGES_NAME,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            is_online: user.is_online,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<&User> for UserSummaryResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

impl UserSummaryResponse {
    /// Stand-in for a sender whose user row is gone
    pub fn unknown(id: Snowflake) -> Self {
        Self {
            id: id.to_string(),
            name: messenger_core::FALLBACK_USER_NAME.to_string(),
            email: String::new(),
            avatar: None,
        }
    }
}

// ============================================================================
// Member Mappers
// ============================================================================

impl From<&ChatMember> for MemberResponse {
    fn from(member: &ChatMember) -> Self {
        Self {
            user_id: member.user_id.to_string(),
            role: member.role,
            joined_at: member.joined_at,
            last_read_at: member.last_read_at,
            user: None,
        }
    }
}

impl From<&MemberProfile> for MemberResponse {
    fn from(profile: &MemberProfile) -> Self {
        Self {
            user: Some(UserResponse::from(&profile.user)),
            ..Self::from(&profile.member)
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl From<&Attachment> for AttachmentResponse {
    fn from(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id.to_string(),
            url: attachment.url.clone(),
            name: attachment.name.clone(),
            size: attachment.size,
            mime_type: attachment.mime_type.clone(),
        }
    }
}

impl From<&Reaction> for ReactionResponse {
    fn from(reaction: &Reaction) -> Self {
        Self {
            user_id: reaction.user_id.to_string(),
            emoji: reaction.emoji.clone(),
        }
    }
}

impl From<&Message> for LastMessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            sender_id: message.sender_id.to_string(),
            text: message.text.clone(),
            message_type: message.message_type,
            created_at: message.created_at,
        }
    }
}

/// Reply target reduced to what a preview shows
#[derive(Debug, Clone)]
pub struct ReplyPreview {
    pub id: Snowflake,
    pub text: Option<String>,
    pub sender_name: String,
}

/// A message with everything a client renders alongside it
#[derive(Debug, Clone)]
pub struct MessageWithDetails {
    pub message: Message,
    /// `None` when the sender's user row no longer exists
    pub sender: Option<User>,
    pub attachments: Vec<Attachment>,
    pub reactions: Vec<Reaction>,
    pub reply_to: Option<ReplyPreview>,
}

impl From<MessageWithDetails> for MessageResponse {
    fn from(details: MessageWithDetails) -> Self {
        let MessageWithDetails {
            message,
            sender,
            attachments,
            reactions,
            reply_to,
        } = details;

        Self {
            id: message.id.to_string(),
            chat_id: message.chat_id.to_string(),
            sender: sender.as_ref().map_or_else(
                || UserSummaryResponse::unknown(message.sender_id),
                UserSummaryResponse::from,
            ),
            text: message.text,
            message_type: message.message_type,
            reply_to: reply_to.map(|r| ReplyPreviewResponse {
                id: r.id.to_string(),
                text: r.text,
                sender_name: r.sender_name,
            }),
            attachments: attachments.iter().map(AttachmentResponse::from).collect(),
            reactions: reactions.iter().map(ReactionResponse::from).collect(),
            created_at: message.created_at,
        }
    }
}

// ============================================================================
// Chat Mappers
// ============================================================================

/// A chat seen by one member, with the data its summary needs
#[derive(Debug, Clone)]
pub struct ChatWithMembers {
    pub chat: Chat,
    pub viewer_id: Snowflake,
    pub members: Vec<MemberProfile>,
    pub latest: Option<Message>,
    pub unread_count: i64,
}

impl ChatWithMembers {
    /// Peer shown for a direct chat: the other member, or the viewer in a self-chat
    fn peer(&self) -> Option<PeerResponse> {
        if !self.chat.is_direct() {
            return None;
        }

        if self.chat.is_self_chat() {
            let me = self.members.iter().find(|m| m.user.id == self.viewer_id)?;
            return Some(PeerResponse {
                id: me.user.id.to_string(),
                name: SAVED_MESSAGES_NAME.to_string(),
                avatar: me.user.avatar.clone(),
                is_online: true,
            });
        }

        let counterpart = self
            .chat
            .direct_key
            .and_then(|key| key.counterpart_of(self.viewer_id));
        self.members
            .iter()
            .find(|m| Some(m.user.id) == counterpart)
            .map(|other| PeerResponse {
                id: other.user.id.to_string(),
                name: other.user.name.clone(),
                avatar: other.user.avatar.clone(),
                is_online: other.user.is_online,
            })
    }

    pub fn summary(&self) -> ChatSummaryResponse {
        let peer = self.peer();
        let (name, avatar) = match &peer {
            Some(p) => (p.name.clone(), p.avatar.clone()),
            None => (
                self.chat.name.clone().unwrap_or_default(),
                self.chat.avatar.clone(),
            ),
        };

        ChatSummaryResponse {
            id: self.chat.id.to_string(),
            chat_type: self.chat.chat_type,
            name,
            avatar,
            peer,
            last_message: self.latest.as_ref().map(LastMessageResponse::from),
            last_message_at: self.chat.last_message_at,
            unread_count: self.unread_count,
            created_at: self.chat.created_at,
        }
    }
}

impl From<ChatWithMembers> for ChatSummaryResponse {
    fn from(view: ChatWithMembers) -> Self {
        view.summary()
    }
}

impl From<ChatWithMembers> for ChatDetailResponse {
    fn from(view: ChatWithMembers) -> Self {
        Self {
            summary: view.summary(),
            description: view.chat.description.clone(),
            members: view.members.iter().map(MemberResponse::from).collect(),
        }
    }
}
