//! Domain entities

mod chat;
mod member;
mod message;
mod reaction;
mod user;

pub use chat::{Chat, ChatType};
pub use member::{ChatMember, MemberProfile, MemberRole};
pub use message::{Attachment, Message, MessageType};
pub use reaction::{Reaction, ReactionToggle};
pub use user::{IdentityProfile, Principal, User, FALLBACK_USER_NAME};

/// A stored enum value that is not one of the closed variants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
