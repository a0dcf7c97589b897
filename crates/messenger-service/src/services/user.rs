//! User service
//!
//! Current-user lookup and the user directory.

use messenger_core::{DomainError, Snowflake};
use tracing::instrument;

use crate::dto::{UserResponse, UsersResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Directory page size when the caller asks for none
pub const DEFAULT_DIRECTORY_LIMIT: i64 = 50;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get current authenticated user
    #[instrument(skip(self))]
    pub async fn current_user(&self, user_id: Snowflake) -> ServiceResult<UserResponse> {
        let user = self
            .ctx
            .storage(self.ctx.user_repo().find_by_id(user_id))
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        Ok(UserResponse::from(&user))
    }

    /// Everyone except the caller, ordered by name
    #[instrument(skip(self))]
    pub async fn list_directory(
        &self,
        user_id: Snowflake,
        limit: Option<i64>,
    ) -> ServiceResult<UsersResponse> {
        let limit = limit.unwrap_or(DEFAULT_DIRECTORY_LIMIT);
        let users = self
            .ctx
            .storage(self.ctx.user_repo().list_except(user_id, limit))
            .await?;

        Ok(UsersResponse {
            users: users.iter().map(UserResponse::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::TestContext;
    use messenger_core::ErrorKind;

    #[tokio::test]
    async fn test_current_user() {
        let t = TestContext::new();
        let ada = t.user("ada").await;

        let me = UserService::new(&t.ctx).current_user(ada.id).await.unwrap();
        assert_eq!(me.id, ada.id.to_string());
        assert_eq!(me.email, "ada@example.com");

        let err = UserService::new(&t.ctx)
            .current_user(Snowflake::new(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_directory_excludes_caller_and_sorts_by_name() {
        let t = TestContext::new();
        let carol = t.user("carol").await;
        t.user("bob").await;
        t.user("alice").await;

        let page = UserService::new(&t.ctx)
            .list_directory(carol.id, None)
            .await
            .unwrap();
        let names: Vec<_> = page.users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["alice", "bob"]);

        let page = UserService::new(&t.ctx)
            .list_directory(carol.id, Some(1))
            .await
            .unwrap();
        assert_eq!(page.users.len(), 1);
    }
}
