//! Test fixtures and data generators
//!
//! Request builders and the slices of the response bodies the tests read.

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A principal the test can mint tokens for
#[derive(Debug, Clone)]
pub struct TestUser {
    pub external_id: String,
    pub name: String,
    pub email: String,
}

impl TestUser {
    pub fn named(first: &str, last: &str) -> Self {
        let suffix = unique_suffix();
        Self {
            external_id: format!("idp|{}-{suffix}", first.to_lowercase()),
            name: format!("{first} {last}"),
            email: format!("{}{suffix}@example.com", first.to_lowercase()),
        }
    }
}

pub fn direct_chat_body(other_user_id: &str) -> Value {
    json!({ "otherUserId": other_user_id })
}

pub fn group_chat_body(name: &str, members: &[&str]) -> Value {
    json!({ "name": name, "members": members })
}

pub fn text_message_body(chat_id: &str, text: &str) -> Value {
    json!({ "chatId": chat_id, "text": text })
}

pub fn reaction_body(emoji: &str) -> Value {
    json!({ "emoji": emoji })
}

/// User response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsersBody {
    pub users: Vec<UserBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerBody {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessageBody {
    pub id: String,
    pub sender_id: String,
    pub text: Option<String>,
}

/// Chat summary as listed for one viewer
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub id: String,
    #[serde(rename = "type")]
    pub chat_type: String,
    pub name: String,
    pub peer: Option<PeerBody>,
    pub last_message: Option<LastMessageBody>,
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberBody {
    pub user_id: String,
    pub role: String,
}

/// Chat with its membership
#[derive(Debug, Deserialize)]
pub struct ChatDetailBody {
    #[serde(flatten)]
    pub summary: ChatBody,
    pub members: Vec<MemberBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderBody {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionBody {
    pub user_id: String,
    pub emoji: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    pub id: String,
    pub chat_id: String,
    pub sender: SenderBody,
    pub text: Option<String>,
    pub reactions: Vec<ReactionBody>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    pub status: String,
    pub reaction: Option<ReactionBody>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetailBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetailBody {
    pub code: String,
    pub message: String,
}
