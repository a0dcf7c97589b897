//! Identity resolver
//!
//! Maps a verified principal to the internal user, creating the user the
//! first time the principal is seen.

use messenger_core::entities::{Principal, User};
use messenger_core::DomainError;
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Identity resolver
pub struct IdentityResolver<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> IdentityResolver<'a> {
    /// Create a new IdentityResolver
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Verify a bearer token and resolve the principal it names
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> ServiceResult<User> {
        let principal = self.ctx.jwt_service().verify(token)?;
        self.resolve(Some(&principal)).await
    }

    /// Resolve a principal to its user, creating the user on first sight
    ///
    /// Concurrent first resolutions of one principal converge on a single
    /// row through the unique external id.
    #[instrument(
        skip(self, principal),
        fields(external_id = principal.map(|p| p.external_id.as_str()))
    )]
    pub async fn resolve(&self, principal: Option<&Principal>) -> ServiceResult<User> {
        let principal = principal.ok_or(DomainError::MissingPrincipal)?;

        if let Some(user) = self
            .ctx
            .storage(self.ctx.user_repo().find_by_external_id(&principal.external_id))
            .await?
        {
            return Ok(user);
        }

        let profile = self.ctx.identity_provider().fetch_profile(principal).await?;
        let candidate =
            User::from_profile(self.ctx.generate_id(), &principal.external_id, &profile);

        let user = self
            .ctx
            .storage(self.ctx.user_repo().create_or_get(&candidate))
            .await?;

        if user.id == candidate.id {
            info!(user_id = %user.id, "User created on first sign-in");
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use messenger_core::traits::{IdentityProvider, RepoResult};
    use messenger_core::{ErrorKind, IdentityProfile};

    use super::*;
    use crate::services::test_support::{context_with_provider, TestContext};

    /// Counts calls and always answers with the same profile
    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityProvider for CountingProvider {
        async fn fetch_profile(&self, _principal: &Principal) -> RepoResult<IdentityProfile> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(IdentityProfile {
                first_name: Some("Ada".to_string()),
                last_name: Some("Lovelace".to_string()),
                emails: vec!["ada@example.com".to_string()],
                image_url: None,
            })
        }
    }

    struct MissingProvider;

    #[async_trait]
    impl IdentityProvider for MissingProvider {
        async fn fetch_profile(&self, principal: &Principal) -> RepoResult<IdentityProfile> {
            Err(DomainError::UnknownPrincipal(principal.external_id.clone()))
        }
    }

    #[tokio::test]
    async fn test_missing_principal_is_unauthenticated() {
        let t = TestContext::new();
        let err = IdentityResolver::new(&t.ctx).resolve(None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[tokio::test]
    async fn test_first_sight_creates_then_reuses() {
        let provider = Arc::new(CountingProvider::default());
        let t = context_with_provider(provider.clone());
        let resolver = IdentityResolver::new(&t.ctx);
        let principal = Principal::new("user_ada");

        let first = resolver.resolve(Some(&principal)).await.unwrap();
        let second = resolver.resolve(Some(&principal)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.name, "Ada Lovelace");
        assert_eq!(first.email, "ada@example.com");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_resolutions_create_one_user() {
        let provider = Arc::new(CountingProvider::default());
        let t = context_with_provider(provider);
        let principal = Principal::new("user_race");

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let ctx = t.ctx.clone();
                let principal = principal.clone();
                tokio::spawn(async move {
                    IdentityResolver::new(&ctx).resolve(Some(&principal)).await
                })
            })
            .collect();

        let ids: Vec<_> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap().id)
            .collect();

        assert!(ids.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_unknown_principal_at_provider() {
        let t = context_with_provider(Arc::new(MissingProvider));
        let err = IdentityResolver::new(&t.ctx)
            .resolve(Some(&Principal::new("ghost")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[tokio::test]
    async fn test_authenticate_with_token() {
        let t = TestContext::new();
        let token = t.token_for("user_tok");

        let user = IdentityResolver::new(&t.ctx).authenticate(&token).await.unwrap();
        assert_eq!(user.external_id, "user_tok");

        let err = IdentityResolver::new(&t.ctx)
            .authenticate("not-a-token")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}
