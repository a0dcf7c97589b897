//! Business logic services
//!
//! Each service borrows a [`ServiceContext`] for the duration of one call and
//! runs every repository call under the storage deadline.

pub mod context;
pub mod conversation;
pub mod error;
pub mod identity;
pub mod membership;
pub mod message;
pub mod reaction;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::{ServiceContext, ServiceContextBuilder, DEFAULT_STORAGE_TIMEOUT};
pub use conversation::ConversationService;
pub use error::{ServiceError, ServiceResult};
pub use identity::IdentityResolver;
pub use membership::{MembershipService, NewGroup};
pub use message::MessageService;
pub use reaction::{ReactionService, MAX_EMOJI_LENGTH};
pub use user::{UserService, DEFAULT_DIRECTORY_LIMIT};
