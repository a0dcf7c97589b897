//! Redis Pub/Sub publisher.
//!
//! Publishes event envelopes to Redis channels for real-time consumers.

use redis::AsyncCommands;

use messenger_core::EventEnvelope;

use crate::pool::{RedisResult, SharedRedisPool};
use crate::pubsub::PubSubChannel;

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: SharedRedisPool,
}

impl Publisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: SharedRedisPool) -> Self {
        Self { pool }
    }

    /// Publish an envelope to a channel; returns the receiver count
    pub async fn publish(
        &self,
        channel: &PubSubChannel,
        envelope: &EventEnvelope,
    ) -> RedisResult<u32> {
        let payload = serde_json::to_string(envelope)?;
        self.publish_raw(channel, &payload, &envelope.kind).await
    }

    async fn publish_raw(
        &self,
        channel: &PubSubChannel,
        payload: &str,
        kind: &str,
    ) -> RedisResult<u32> {
        let mut conn = self.pool.get().await?;
        let channel_name = channel.name();

        let receivers: u32 = conn.publish(&channel_name, payload).await?;

        tracing::debug!(
            channel = %channel_name,
            kind = %kind,
            receivers = receivers,
            "Published event"
        );

        Ok(receivers)
    }
}
