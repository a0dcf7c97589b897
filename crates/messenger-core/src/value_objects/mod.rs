//! Value objects - immutable, identity-less domain types

mod direct_key;
mod snowflake;

pub use direct_key::DirectChatKey;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError, WorkerIdOutOfRange};
