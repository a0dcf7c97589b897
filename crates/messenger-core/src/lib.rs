//! # messenger-core
//!
//! Domain layer containing entities, value objects, repository traits, and domain events.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Attachment, Chat, ChatMember, ChatType, IdentityProfile, MemberProfile, MemberRole, Message,
    MessageType, Principal, Reaction, ReactionToggle, UnknownVariant, User, FALLBACK_USER_NAME,
};
pub use error::{DomainError, ErrorKind};
pub use events::{
    ChatCreatedEvent, DomainEvent, EventEnvelope, MessageAppendedEvent, ReactionToggledEvent,
};
pub use traits::{
    ChatRepository, EventNotifier, IdentityProvider, MessageQuery, MessageRepository,
    ReactionRepository, RepoResult, UserRepository, MAX_MESSAGE_PAGE,
};
pub use value_objects::{
    DirectChatKey, Snowflake, SnowflakeGenerator, SnowflakeParseError, WorkerIdOutOfRange,
};
