//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in messenger-core.
//! Each repository handles database operations for a specific domain entity.

mod chat;
mod error;
mod message;
mod reaction;
mod user;

use messenger_core::value_objects::Snowflake;

pub use chat::PgChatRepository;
pub use error::{map_db_error, map_unique_violation};
pub use message::PgMessageRepository;
pub use reaction::PgReactionRepository;
pub use user::PgUserRepository;

/// Snowflakes as an `ANY($n)` bind parameter
fn raw_ids(ids: &[Snowflake]) -> Vec<i64> {
    ids.iter().copied().map(Snowflake::into_inner).collect()
}
