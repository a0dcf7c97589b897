//! Redis connection pool.

mod redis_pool;

pub use redis_pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
    DEFAULT_WAIT_TIMEOUT,
};
