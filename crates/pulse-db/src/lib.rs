//! # pulse-db
//!
//! PostgreSQL implementations (via SQLx) of the store traits defined in
//! `pulse-core`: the durable message store, the notification store, and
//! the user directory, plus connection pool management.

pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, DatabaseConfig, PgPool};
pub use repositories::{PgMessageRepository, PgNotificationRepository, PgUserRepository};
