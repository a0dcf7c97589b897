//! # messenger-db
//!
//! Storage layer implementing the messenger-core repository traits.
//!
//! ## Overview
//!
//! - PostgreSQL repositories via SQLx (`Pg*Repository`), with models, mappers
//!   and the bundled schema migrations
//! - [`MemoryStore`], an in-process implementation of the same traits used
//!   when no database is configured and by the service tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use messenger_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use messenger_db::PgChatRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::new("postgres://localhost/messenger")).await?;
//!     run_migrations(&pool).await?;
//!     let chats = PgChatRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, ping, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    map_db_error, PgChatRepository, PgMessageRepository, PgReactionRepository, PgUserRepository,
};
