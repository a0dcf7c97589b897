//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment,
    IdentityConfig, RateLimitConfig, RedisConfig, ServerConfig, SnowflakeConfig, TimeoutConfig,
    MAX_WORKER_ID,
};
