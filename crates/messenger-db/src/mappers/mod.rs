//! Entity to model mappers
//!
//! Conversions between domain entities (messenger-core) and database rows.
//! Enum columns are closed sets, so rows carrying an unknown value fail the
//! conversion with `DomainError::DatabaseError` instead of being coerced.

mod chat;
mod message;
mod user;

use messenger_core::error::DomainError;
use messenger_core::UnknownVariant;

pub use chat::{ChatInsert, MemberInsert};
pub use message::MessageInsert;

fn corrupt_row(e: UnknownVariant) -> DomainError {
    DomainError::DatabaseError(format!("corrupt row: {e}"))
}
