//! Chat and member entity <-> model mappers

use messenger_core::entities::{Chat, ChatMember, ChatType, MemberProfile, MemberRole, User};
use messenger_core::error::DomainError;
use messenger_core::value_objects::{DirectChatKey, Snowflake};

use super::corrupt_row;
use crate::models::{ChatMemberModel, ChatModel, ChatWithMemberModel, MemberWithUserModel};

impl TryFrom<ChatModel> for Chat {
    type Error = DomainError;

    fn try_from(model: ChatModel) -> Result<Self, Self::Error> {
        let chat_type: ChatType = model.chat_type.parse().map_err(corrupt_row)?;
        let direct_key = model
            .direct_key
            .as_deref()
            .map(DirectChatKey::parse)
            .transpose()
            .map_err(|e| DomainError::DatabaseError(format!("corrupt direct key: {e}")))?;

        Ok(Chat {
            id: Snowflake::new(model.id),
            chat_type,
            name: model.name,
            description: model.description,
            avatar: model.avatar,
            direct_key,
            last_message_at: model.last_message_at,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<ChatMemberModel> for ChatMember {
    type Error = DomainError;

    fn try_from(model: ChatMemberModel) -> Result<Self, Self::Error> {
        Ok(ChatMember {
            chat_id: Snowflake::new(model.chat_id),
            user_id: Snowflake::new(model.user_id),
            role: model.role.parse::<MemberRole>().map_err(corrupt_row)?,
            joined_at: model.joined_at,
            last_read_at: model.last_read_at,
        })
    }
}

impl TryFrom<MemberWithUserModel> for MemberProfile {
    type Error = DomainError;

    fn try_from(model: MemberWithUserModel) -> Result<Self, Self::Error> {
        let member = ChatMember {
            chat_id: Snowflake::new(model.chat_id),
            user_id: Snowflake::new(model.user_id),
            role: model.role.parse::<MemberRole>().map_err(corrupt_row)?,
            joined_at: model.joined_at,
            last_read_at: model.last_read_at,
        };
        let user = User {
            id: member.user_id,
            external_id: model.user_external_id,
            name: model.user_name,
            email: model.user_email,
            avatar: model.user_avatar,
            is_online: model.user_is_online,
            created_at: model.user_created_at,
            updated_at: model.user_updated_at,
        };
        Ok(MemberProfile { member, user })
    }
}

impl TryFrom<ChatWithMemberModel> for (Chat, ChatMember) {
    type Error = DomainError;

    fn try_from(model: ChatWithMemberModel) -> Result<Self, Self::Error> {
        let member = ChatMember {
            chat_id: Snowflake::new(model.chat.id),
            user_id: Snowflake::new(model.m_user_id),
            role: model.m_role.parse::<MemberRole>().map_err(corrupt_row)?,
            joined_at: model.m_joined_at,
            last_read_at: model.m_last_read_at,
        };
        let chat = Chat::try_from(model.chat)?;
        Ok((chat, member))
    }
}

/// Convert Chat entity reference to values for database insertion
pub struct ChatInsert<'a> {
    pub id: i64,
    pub chat_type: &'static str,
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub avatar: Option<&'a str>,
    pub direct_key: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> ChatInsert<'a> {
    pub fn new(chat: &'a Chat) -> Self {
        Self {
            id: chat.id.into_inner(),
            chat_type: chat.chat_type.as_str(),
            name: chat.name.as_deref(),
            description: chat.description.as_deref(),
            avatar: chat.avatar.as_deref(),
            direct_key: chat.direct_key.map(|k| k.as_key()),
            created_at: chat.created_at,
        }
    }
}

/// Column-wise member values for a single `UNNEST` insert
#[derive(Default)]
pub struct MemberInsert {
    pub chat_ids: Vec<i64>,
    pub user_ids: Vec<i64>,
    pub roles: Vec<String>,
    pub joined_at: Vec<chrono::DateTime<chrono::Utc>>,
}

impl MemberInsert {
    pub fn new(members: &[ChatMember]) -> Self {
        let mut insert = Self::default();
        for m in members {
            insert.chat_ids.push(m.chat_id.into_inner());
            insert.user_ids.push(m.user_id.into_inner());
            insert.roles.push(m.role.as_str().to_string());
            insert.joined_at.push(m.joined_at);
        }
        insert
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_chat_model_rejects_unknown_type() {
        let model = ChatModel {
            id: 1,
            chat_type: "forum".into(),
            name: None,
            description: None,
            avatar: None,
            direct_key: None,
            last_message_at: None,
            created_at: Utc::now(),
        };
        let err = Chat::try_from(model).unwrap_err();
        assert!(matches!(err, DomainError::DatabaseError(_)));
    }

    #[test]
    fn test_direct_chat_model() {
        let model = ChatModel {
            id: 5,
            chat_type: "direct".into(),
            name: None,
            description: None,
            avatar: None,
            direct_key: Some("1:2".into()),
            last_message_at: None,
            created_at: Utc::now(),
        };
        let chat = Chat::try_from(model).unwrap();
        assert_eq!(
            chat.direct_key,
            Some(DirectChatKey::new(Snowflake::new(2), Snowflake::new(1)))
        );
    }

    #[test]
    fn test_member_insert_columns() {
        let members = [
            ChatMember::new(Snowflake::new(1), Snowflake::new(10), MemberRole::Owner),
            ChatMember::new(Snowflake::new(1), Snowflake::new(11), MemberRole::Member),
        ];
        let insert = MemberInsert::new(&members);
        assert_eq!(insert.user_ids, vec![10, 11]);
        assert_eq!(insert.roles, vec!["owner", "member"]);
    }
}
