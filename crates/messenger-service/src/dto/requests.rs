//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Bodies are camelCase; ids arrive as strings or numbers.

use messenger_core::{MessageType, Snowflake};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================================================
// User Requests
// ============================================================================

/// Query parameters for the user directory
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryQuery {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
}

// ============================================================================
// Chat Requests
// ============================================================================

/// Get-or-create a direct chat with another user (or yourself)
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDirectChatRequest {
    #[validate(required(message = "otherUserId is required"))]
    pub other_user_id: Option<Snowflake>,
}

/// Create group request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupChatRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Group name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 500, message = "A group needs 1-500 members"))]
    pub members: Vec<Snowflake>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(url(message = "Avatar must be a URL"))]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    #[validate(required(message = "userId is required"))]
    pub user_id: Option<Snowflake>,
}

// ============================================================================
// Message Requests
// ============================================================================

/// File metadata sent alongside a message; the bytes live elsewhere
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 2048, message = "Attachment url is required"))]
    pub url: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Attachment name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(range(min = 0, message = "Attachment size cannot be negative"))]
    pub size: i64,

    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Attachment mimeType is required"))]
    pub mime_type: String,
}

/// Send message request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(required(message = "chatId is required"))]
    pub chat_id: Option<Snowflake>,

    #[validate(length(max = 4000, message = "Message text must be at most 4000 characters"))]
    pub text: Option<String>,

    /// Defaults to TEXT
    #[serde(rename = "type", default)]
    pub message_type: MessageType,

    pub reply_to_id: Option<Snowflake>,

    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 attachments per message"), nested)]
    pub attachments: Vec<AttachmentRequest>,
}

/// Query parameters for listing a chat's messages
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesQuery {
    /// Only messages strictly older than this one
    pub before: Option<Snowflake>,

    #[validate(range(min = 1, max = 200, message = "Limit must be between 1 and 200"))]
    pub limit: Option<i64>,
}

// ============================================================================
// Reaction Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReactionRequest {
    #[serde(default)]
    pub emoji: String,
}
