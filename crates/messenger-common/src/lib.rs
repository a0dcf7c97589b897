//! # messenger-common
//!
//! Shared utilities including configuration, error handling, principal verification, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{Claims, ClaimsIdentityProvider, HttpIdentityProvider, JwtService};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment,
    IdentityConfig, RateLimitConfig, RedisConfig, ServerConfig, SnowflakeConfig, TimeoutConfig,
    MAX_WORKER_ID,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
