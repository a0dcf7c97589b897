//! Event notifier backed by Redis Pub/Sub

use async_trait::async_trait;
use tracing::instrument;

use messenger_core::error::DomainError;
use messenger_core::events::DomainEvent;
use messenger_core::traits::{EventNotifier, RepoResult};

use crate::pool::{RedisPoolError, SharedRedisPool};
use crate::pubsub::{PubSubChannel, Publisher};

/// Publishes every event as `{kind, chatId, payload}` on `chat:{chatId}`
#[derive(Clone)]
pub struct RedisEventNotifier {
    publisher: Publisher,
}

impl RedisEventNotifier {
    pub fn new(pool: SharedRedisPool) -> Self {
        Self {
            publisher: Publisher::new(pool),
        }
    }
}

impl From<RedisPoolError> for DomainError {
    fn from(err: RedisPoolError) -> Self {
        if err.is_transient() {
            DomainError::StorageUnavailable(err.to_string())
        } else {
            DomainError::CacheError(err.to_string())
        }
    }
}

#[async_trait]
impl EventNotifier for RedisEventNotifier {
    #[instrument(skip(self, event), fields(kind = event.kind(), chat_id = %event.chat_id()))]
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()> {
        let channel = PubSubChannel::chat(event.chat_id());
        self.publisher.publish(&channel, &event.envelope()).await?;
        Ok(())
    }
}
