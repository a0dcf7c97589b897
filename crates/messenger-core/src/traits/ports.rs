//! External collaborators the services call out to

use async_trait::async_trait;

use super::RepoResult;
use crate::entities::{IdentityProfile, Principal};
use crate::events::DomainEvent;

/// Source of profile attributes for principals seen for the first time
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn fetch_profile(&self, principal: &Principal) -> RepoResult<IdentityProfile>;
}

/// Fan-out boundary for domain events
#[async_trait]
pub trait EventNotifier: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()>;
}
