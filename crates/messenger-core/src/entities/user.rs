//! User entity and the identity-provider profile it is created from

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Display name used when the provider knows neither a name nor an email
pub const FALLBACK_USER_NAME: &str = "User";

/// Internal user record, keyed by the external identity it mirrors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a first-sight record from provider attributes
    pub fn from_profile(
        id: Snowflake,
        external_id: impl Into<String>,
        profile: &IdentityProfile,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            external_id: external_id.into(),
            name: profile.display_name(),
            email: profile.primary_email().unwrap_or_default().to_string(),
            avatar: profile.image_url.clone(),
            is_online: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A principal whose token has already been verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Subject assigned by the identity provider
    pub external_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
}

impl Principal {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            name: None,
            email: None,
            picture: None,
        }
    }
}

/// Profile attributes as reported by the identity provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub emails: Vec<String>,
    pub image_url: Option<String>,
}

impl IdentityProfile {
    pub fn primary_email(&self) -> Option<&str> {
        self.emails.first().map(String::as_str).filter(|e| !e.is_empty())
    }

    /// "first last", else the email's local part, else [`FALLBACK_USER_NAME`]
    pub fn display_name(&self) -> String {
        if let Some(first) = self.first_name.as_deref().filter(|f| !f.trim().is_empty()) {
            let last = self.last_name.as_deref().unwrap_or_default();
            return format!("{first} {last}").trim().to_string();
        }

        self.primary_email()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .map_or_else(|| FALLBACK_USER_NAME.to_string(), str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: Option<&str>, last: Option<&str>, email: Option<&str>) -> IdentityProfile {
        IdentityProfile {
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            emails: email.map(String::from).into_iter().collect(),
            image_url: Some("https://img.example/a.png".to_string()),
        }
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(profile(Some("Ada"), Some("Lovelace"), None).display_name(), "Ada Lovelace");
        assert_eq!(profile(Some("Ada"), None, Some("x@y.z")).display_name(), "Ada");
    }

    #[test]
    fn test_display_name_falls_back_to_email_local_part() {
        assert_eq!(profile(None, Some("L"), Some("ada@example.com")).display_name(), "ada");
    }

    #[test]
    fn test_display_name_last_resort() {
        assert_eq!(profile(None, None, None).display_name(), FALLBACK_USER_NAME);
        assert_eq!(profile(Some("  "), None, Some("@host")).display_name(), FALLBACK_USER_NAME);
    }

    #[test]
    fn test_user_from_profile() {
        let p = profile(Some("Ada"), None, Some("ada@example.com"));
        let user = User::from_profile(Snowflake::new(5), "ext_1", &p);
        assert_eq!(user.external_id, "ext_1");
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.avatar.as_deref(), Some("https://img.example/a.png"));
        assert!(!user.is_online);
    }

    #[test]
    fn test_user_from_profile_without_email() {
        let user = User::from_profile(Snowflake::new(5), "ext_2", &IdentityProfile::default());
        assert_eq!(user.email, "");
        assert_eq!(user.name, FALLBACK_USER_NAME);
    }
}
