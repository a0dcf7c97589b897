//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use messenger_core::{ChatType, MemberRole, MessageType, ReactionToggle};
use serde::Serialize;

/// Display name of a user's chat with themselves
pub const SAVED_MESSAGES_NAME: &str = "Saved Messages";

// ============================================================================
// User Responses
// ============================================================================

/// Full user record (current user, directory entries)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
}

/// Sender summary embedded in messages
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

// ============================================================================
// Chat Responses
// ============================================================================

/// The other side of a direct chat as the viewer sees it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub is_online: bool,
}

/// Most recent message shown in a chat list row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessageResponse {
    pub id: String,
    pub sender_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub created_at: DateTime<Utc>,
}

/// One row of "list my chats"
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummaryResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub chat_type: ChatType,
    /// Resolved display name; for direct chats the peer's name
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<PeerResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<LastMessageResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub user_id: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub last_read_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

/// A chat with its membership, returned by create and open operations
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDetailResponse {
    #[serde(flatten)]
    pub summary: ChatSummaryResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub members: Vec<MemberResponse>,
}

// ============================================================================
// Message Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub id: String,
    pub url: String,
    pub name: String,
    pub size: i64,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionResponse {
    pub user_id: String,
    pub emoji: String,
}

/// Short preview of the message being replied to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPreviewResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub sender_name: String,
}

/// Message response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub chat_id: String,
    pub sender: UserSummaryResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<ReplyPreviewResponse>,
    pub attachments: Vec<AttachmentResponse>,
    pub reactions: Vec<ReactionResponse>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a reaction toggle
#[derive(Debug, Clone, Serialize)]
pub struct ToggleReactionResponse {
    pub status: ReactionToggle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<ReactionResponse>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each backing service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    /// `None` marks a backend that is not configured (in-memory / in-process)
    pub fn ready(database: Option<bool>, redis: Option<bool>) -> Self {
        fn label(check: Option<bool>) -> String {
            match check {
                Some(true) => "healthy",
                Some(false) => "unhealthy",
                None => "disabled",
            }
            .to_string()
        }

        let all_healthy = database.unwrap_or(true) && redis.unwrap_or(true);
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: label(database),
                redis: label(redis),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response() {
        let health = HealthResponse::healthy();
        assert_eq!(health.status, "healthy");
    }

    #[test]
    fn test_readiness_response() {
        let ready = ReadinessResponse::ready(Some(true), None);
        assert!(ready.is_ready());
        assert_eq!(ready.checks.database, "healthy");
        assert_eq!(ready.checks.redis, "disabled");

        let not_ready = ReadinessResponse::ready(Some(true), Some(false));
        assert!(!not_ready.is_ready());
        assert_eq!(not_ready.checks.redis, "unhealthy");
    }

    #[test]
    fn test_toggle_response_shape() {
        let removed = ToggleReactionResponse {
            status: ReactionToggle::Removed,
            reaction: None,
        };
        assert_eq!(
            serde_json::to_value(&removed).unwrap(),
            serde_json::json!({"status": "removed"})
        );
    }

    #[test]
    fn test_chat_detail_flattens_summary() {
        let detail = ChatDetailResponse {
            summary: ChatSummaryResponse {
                id: "1".to_string(),
                chat_type: ChatType::Group,
                name: "team".to_string(),
                avatar: None,
                peer: None,
                last_message: None,
                last_message_at: None,
                unread_count: 0,
                created_at: Utc::now(),
            },
            description: None,
            members: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["type"], "GROUP");
        assert_eq!(json["unreadCount"], 0);
        assert!(json["members"].as_array().unwrap().is_empty());
    }
}
