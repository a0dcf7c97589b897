//! Chat membership - the (chat, user) association with role and read state

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{UnknownVariant, User};
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Owners and admins may add members to group chats
    pub fn can_manage_members(self) -> bool {
        match self {
            Self::Owner | Self::Admin => true,
            Self::Member => false,
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(UnknownVariant::new("member role", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMember {
    pub chat_id: Snowflake,
    pub user_id: Snowflake,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    /// `None` until the member first marks the chat read
    pub last_read_at: Option<DateTime<Utc>>,
}

impl ChatMember {
    pub fn new(chat_id: Snowflake, user_id: Snowflake, role: MemberRole) -> Self {
        Self {
            chat_id,
            user_id,
            role,
            joined_at: Utc::now(),
            last_read_at: None,
        }
    }

    /// Whether a message from `sender_id` at `created_at` is unread for this member
    pub fn is_unread(&self, sender_id: Snowflake, created_at: DateTime<Utc>) -> bool {
        sender_id != self.user_id && self.last_read_at.is_none_or(|read| created_at > read)
    }
}

/// A membership row joined with the member's user record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub member: ChatMember,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_role_round_trip() {
        for role in [MemberRole::Owner, MemberRole::Admin, MemberRole::Member] {
            assert_eq!(role.as_str().parse::<MemberRole>().unwrap(), role);
        }
        assert!("moderator".parse::<MemberRole>().is_err());
    }

    #[test]
    fn test_can_manage_members() {
        assert!(MemberRole::Owner.can_manage_members());
        assert!(MemberRole::Admin.can_manage_members());
        assert!(!MemberRole::Member.can_manage_members());
    }

    #[test]
    fn test_unread_rules() {
        let me = Snowflake::new(1);
        let other = Snowflake::new(2);
        let mut member = ChatMember::new(Snowflake::new(9), me, MemberRole::Member);
        let t = Utc::now();

        // never read: everything from others counts
        assert!(member.is_unread(other, t - Duration::days(1)));
        assert!(!member.is_unread(me, t));

        member.last_read_at = Some(t);
        assert!(!member.is_unread(other, t));
        assert!(member.is_unread(other, t + Duration::milliseconds(1)));
    }
}
