//! Redis connection pool for event fan-out.
//!
//! deadpool connects lazily, so building the pool never touches the network.
//! Connection checkout is bounded by `wait_timeout` so a stalled Redis slows a
//! publish down by at most that long.

use std::sync::Arc;
use std::time::{Duration, Instant};

use deadpool_redis::{Config, Pool, PoolError, Runtime};
use messenger_common::RedisConfig;

/// Checkout deadline used when none is configured
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    pub url: String,
    pub max_connections: usize,
    /// How long a caller may wait for a free or fresh connection
    pub wait_timeout: Duration,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl From<&RedisConfig> for RedisPoolConfig {
    fn from(config: &RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
            ..Self::default()
        }
    }
}

impl RedisPoolConfig {
    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }
}

/// Failures of the Redis side of event delivery
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("invalid Redis pool settings: {0}")]
    Setup(String),

    #[error("no Redis connection available: {0}")]
    Unavailable(#[from] PoolError),

    #[error("Redis command failed: {0}")]
    Command(#[from] redis::RedisError),

    #[error("event encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RedisPoolError {
    /// Whether retrying later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable(_) => true,
            Self::Command(e) => e.is_io_error() || e.is_timeout() || e.is_connection_dropped(),
            Self::Setup(_) | Self::Encode(_) => false,
        }
    }
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .field("max_size", &status.max_size)
            .finish()
    }
}

impl RedisPool {
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::Setup(e.to_string()))?
            .max_size(config.max_connections)
            .wait_timeout(Some(config.wait_timeout))
            .create_timeout(Some(config.wait_timeout))
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::Setup(e.to_string()))?;

        tracing::info!(
            url = %redacted_url(&config.url),
            max_connections = config.max_connections,
            wait_timeout_ms = config.wait_timeout.as_millis(),
            "Redis pool ready"
        );

        Ok(Self { pool })
    }

    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    pub fn status(&self) -> deadpool_redis::Status {
        self.pool.status()
    }

    /// PING round trip, used by the readiness probe
    pub async fn health_check(&self) -> RedisResult<Duration> {
        let started = Instant::now();
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(started.elapsed())
    }

    /// Stop handing out connections; idle ones are dropped
    pub fn close(&self) {
        self.pool.close();
    }
}

pub type SharedRedisPool = Arc<RedisPool>;

pub fn create_shared_pool(config: RedisPoolConfig) -> RedisResult<SharedRedisPool> {
    RedisPool::new(config).map(Arc::new)
}

/// Strip credentials so the URL can be logged
fn redacted_url(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => match rest.rsplit_once('@') {
            Some((_, host)) => format!("{scheme}://***@{host}"),
            None => url.to_string(),
        },
        None => url.rsplit_once('@').map_or(url, |(_, host)| host).to_string(),
    }
}
