//! # messenger-cache
//!
//! Redis integration: a managed connection pool and the pub/sub side of the
//! event notifier.
//!
//! ## Example
//!
//! ```ignore
//! use messenger_cache::{create_shared_pool, RedisEventNotifier, RedisPoolConfig};
//!
//! let pool = create_shared_pool(RedisPoolConfig::default())?;
//! let notifier = RedisEventNotifier::new(pool.clone());
//! notifier.publish(&event).await?;
//! ```

pub mod notifier;
pub mod pool;
pub mod pubsub;

pub use notifier::RedisEventNotifier;
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
    DEFAULT_WAIT_TIMEOUT,
};
pub use pubsub::{PubSubChannel, Publisher, CHAT_CHANNEL_PREFIX, USER_CHANNEL_PREFIX};
