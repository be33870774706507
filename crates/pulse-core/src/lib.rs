//! # pulse-core
//!
//! Domain layer for the realtime presence/messaging/notification core.
//! Contains entities, value objects, and store traits with zero
//! dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    ConversationSummary, DeliveryStatus, Message, Notification, NotificationKind,
};
pub use error::DomainError;
pub use traits::{
    MessageRepository, NotificationRepository, RepoResult, UserProfile, UserRepository,
};
pub use value_objects::{extract_mentions, Snowflake, SnowflakeGenerator, SnowflakeParseError};
