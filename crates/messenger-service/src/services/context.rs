//! Service context - dependency container for services
//!
//! Holds the repositories, external collaborators, and infrastructure handles
//! every service borrows. Nothing in the service layer reads global state.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use messenger_cache::SharedRedisPool;
use messenger_common::auth::JwtService;
use messenger_core::traits::{
    ChatRepository, EventNotifier, IdentityProvider, MessageRepository, ReactionRepository,
    RepoResult, UserRepository,
};
use messenger_core::{DomainError, DomainEvent, Snowflake, SnowflakeGenerator};
use messenger_db::{MemoryStore, PgPool};
use tracing::warn;

use super::error::{ServiceError, ServiceResult};

/// Deadline applied to storage calls when none is configured
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Service context containing all dependencies
///
/// Cloning is cheap; every handle is reference counted.
#[derive(Clone)]
pub struct ServiceContext {
    // Infrastructure handles, present only for the backends in use
    pool: Option<PgPool>,
    redis_pool: Option<SharedRedisPool>,

    // Repositories
    user_repo: Arc<dyn UserRepository>,
    chat_repo: Arc<dyn ChatRepository>,
    message_repo: Arc<dyn MessageRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,

    // Collaborators
    identity_provider: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn EventNotifier>,
    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,

    storage_timeout: Duration,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Infrastructure ===

    /// PostgreSQL pool, when the database backend is active
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Redis pool, when Redis fan-out is active
    pub fn redis_pool(&self) -> Option<&SharedRedisPool> {
        self.redis_pool.as_ref()
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn chat_repo(&self) -> &dyn ChatRepository {
        self.chat_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    // === Collaborators ===

    pub fn identity_provider(&self) -> &dyn IdentityProvider {
        self.identity_provider.as_ref()
    }

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    pub fn storage_timeout(&self) -> Duration {
        self.storage_timeout
    }

    /// Run one storage call under the storage deadline
    ///
    /// Expiry drops the call (rolling back any open transaction) and reports
    /// a transient `Timeout`.
    pub async fn storage<T, F>(&self, call: F) -> ServiceResult<T>
    where
        F: Future<Output = RepoResult<T>>,
    {
        match tokio::time::timeout(self.storage_timeout, call).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => Err(DomainError::Timeout.into()),
        }
    }

    /// Hand an event to the notifier; failures are logged, never returned
    pub async fn publish(&self, event: DomainEvent) {
        let delivery = self.notifier.publish(&event);
        match tokio::time::timeout(self.storage_timeout, delivery).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(
                    kind = event.kind(),
                    chat_id = %event.chat_id(),
                    error = %e,
                    "Event publish failed"
                );
            }
            Err(_) => {
                warn!(
                    kind = event.kind(),
                    chat_id = %event.chat_id(),
                    "Event publish timed out"
                );
            }
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &self.pool.as_ref().map(|_| "PgPool"))
            .field("redis_pool", &self.redis_pool.as_ref().map(|_| "SharedRedisPool"))
            .field("repositories", &"...")
            .field("storage_timeout", &self.storage_timeout)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    redis_pool: Option<SharedRedisPool>,
    user_repo: Option<Arc<dyn UserRepository>>,
    chat_repo: Option<Arc<dyn ChatRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    notifier: Option<Arc<dyn EventNotifier>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    storage_timeout: Option<Duration>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn redis_pool(mut self, redis_pool: SharedRedisPool) -> Self {
        self.redis_pool = Some(redis_pool);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn chat_repo(mut self, repo: Arc<dyn ChatRepository>) -> Self {
        self.chat_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    /// Back all four repositories with one in-memory store
    pub fn memory_store(self, store: MemoryStore) -> Self {
        let store = Arc::new(store);
        self.user_repo(store.clone())
            .chat_repo(store.clone())
            .message_repo(store.clone())
            .reaction_repo(store)
    }

    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn EventNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = Some(timeout);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::internal(format!("{name} is required")))
        }

        Ok(ServiceContext {
            pool: self.pool,
            redis_pool: self.redis_pool,
            user_repo: required(self.user_repo, "user_repo")?,
            chat_repo: required(self.chat_repo, "chat_repo")?,
            message_repo: required(self.message_repo, "message_repo")?,
            reaction_repo: required(self.reaction_repo, "reaction_repo")?,
            identity_provider: required(self.identity_provider, "identity_provider")?,
            notifier: required(self.notifier, "notifier")?,
            jwt_service: required(self.jwt_service, "jwt_service")?,
            snowflake_generator: self.snowflake_generator.unwrap_or_default(),
            storage_timeout: self.storage_timeout.unwrap_or(DEFAULT_STORAGE_TIMEOUT),
        })
    }
}
