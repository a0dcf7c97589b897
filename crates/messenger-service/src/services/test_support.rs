//! Shared fixtures for service tests

use std::sync::Arc;

use messenger_common::{ClaimsIdentityProvider, JwtService};
use messenger_core::traits::{IdentityProvider, UserRepository};
use messenger_core::{IdentityProfile, Principal, SnowflakeGenerator, User};
use messenger_db::MemoryStore;

use super::context::ServiceContext;
use crate::notifier::BroadcastNotifier;

pub const TEST_SECRET: &str = "service-test-secret";

pub struct TestContext {
    pub ctx: ServiceContext,
    pub store: MemoryStore,
    pub notifier: BroadcastNotifier,
    jwt: JwtService,
    ids: Arc<SnowflakeGenerator>,
}

impl TestContext {
    pub fn new() -> Self {
        context_with_provider(Arc::new(ClaimsIdentityProvider))
    }

    pub fn token_for(&self, external_id: &str) -> String {
        self.jwt.issue(&Principal::new(external_id), 300).unwrap()
    }

    /// Insert a user directly, bypassing the resolver
    pub async fn user(&self, name: &str) -> User {
        let profile = IdentityProfile {
            first_name: Some(name.to_string()),
            last_name: None,
            emails: vec![format!("{name}@example.com")],
            image_url: None,
        };
        let user = User::from_profile(self.ids.generate(), format!("ext_{name}"), &profile);
        self.store.create_or_get(&user).await.unwrap()
    }
}

pub fn context_with_provider(provider: Arc<dyn IdentityProvider>) -> TestContext {
    let store = MemoryStore::new();
    let notifier = BroadcastNotifier::default();
    let jwt = JwtService::new(TEST_SECRET, None);
    let ids = Arc::new(SnowflakeGenerator::default());

    let ctx = ServiceContext::builder()
        .memory_store(store.clone())
        .identity_provider(provider)
        .notifier(Arc::new(notifier.clone()))
        .jwt_service(Arc::new(jwt.clone()))
        .snowflake_generator(ids.clone())
        .build()
        .unwrap();

    TestContext {
        ctx,
        store,
        notifier,
        jwt,
        ids,
    }
}
