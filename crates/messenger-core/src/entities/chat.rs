//! Chat entity - direct, group, or channel conversation

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UnknownVariant;
use crate::value_objects::{DirectChatKey, Snowflake};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatType {
    Direct,
    Group,
    Channel,
}

impl ChatType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Group => "group",
            Self::Channel => "channel",
        }
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Self::Direct),
            "group" => Ok(Self::Group),
            "channel" => Ok(Self::Channel),
            other => Err(UnknownVariant::new("chat type", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: Snowflake,
    pub chat_type: ChatType,
    pub name: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
    /// Present exactly for direct chats
    pub direct_key: Option<DirectChatKey>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn direct(id: Snowflake, key: DirectChatKey) -> Self {
        Self {
            id,
            chat_type: ChatType::Direct,
            name: None,
            description: None,
            avatar: None,
            direct_key: Some(key),
            last_message_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn group(
        id: Snowflake,
        name: String,
        description: Option<String>,
        avatar: Option<String>,
    ) -> Self {
        Self {
            id,
            chat_type: ChatType::Group,
            name: Some(name),
            description,
            avatar,
            direct_key: None,
            last_message_at: None,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_direct(&self) -> bool {
        self.chat_type == ChatType::Direct
    }

    pub fn is_self_chat(&self) -> bool {
        self.direct_key.is_some_and(|key| key.is_self_chat())
    }

    /// Sort key for chat lists; chats without messages fall back to creation time
    pub fn recency(&self) -> DateTime<Utc> {
        self.last_message_at.unwrap_or(self.created_at)
    }

    /// Move `last_message_at` forward, never backwards
    pub fn touch(&mut self, at: DateTime<Utc>) {
        if self.last_message_at.is_none_or(|current| current < at) {
            self.last_message_at = Some(at);
        }
    }
}
