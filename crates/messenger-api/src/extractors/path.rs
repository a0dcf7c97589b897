//! Path parameter extractors
//!
//! Type-safe extraction of Snowflake IDs from path parameters.

use messenger_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

fn parse_id(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}

/// Path parameters with chat_id
#[derive(Debug, Deserialize)]
pub struct ChatIdPath {
    pub chat_id: String,
}

impl ChatIdPath {
    /// Parse chat_id as Snowflake
    pub fn chat_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.chat_id, "chat_id")
    }
}

/// Path parameters with message_id
#[derive(Debug, Deserialize)]
pub struct MessageIdPath {
    pub message_id: String,
}

impl MessageIdPath {
    /// Parse message_id as Snowflake
    pub fn message_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.message_id, "message_id")
    }
}
