//! Store traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs; the infrastructure layer
//! provides the implementation. The realtime core only ever appends
//! records and advances delivery state - no destructive cross-session
//! edits happen through these traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{ConversationSummary, DeliveryStatus, Message, Notification};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Directory projection of a user, enough to resolve mentions and
/// decorate presence events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Snowflake,
    pub username: String,
}

// ============================================================================
// User directory
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<UserProfile>>;

    /// Find user by exact username (mention resolution)
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserProfile>>;
}

// ============================================================================
// Message store
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Append a new message (status `Sent`)
    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Advance a message's delivery status.
    ///
    /// Returns false when the message does not exist or the transition
    /// would regress; the stored status is never moved backwards.
    async fn update_status(
        &self,
        id: Snowflake,
        status: DeliveryStatus,
        read_at: Option<DateTime<Utc>>,
    ) -> RepoResult<bool>;

    /// All messages between two users, in chronological order
    async fn list_conversation(&self, a: Snowflake, b: Snowflake) -> RepoResult<Vec<Message>>;

    /// Per-peer last message and unread count for a user, most recent
    /// conversation first
    async fn list_conversation_summaries(
        &self,
        user_id: Snowflake,
    ) -> RepoResult<Vec<ConversationSummary>>;
}

// ============================================================================
// Notification store
// ============================================================================

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Append a new notification
    async fn create(&self, notification: &Notification) -> RepoResult<()>;

    /// Notifications for a recipient, reverse-chronological, capped at `limit`
    async fn list_by_recipient(
        &self,
        recipient_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<Notification>>;

    /// Mark one notification as read; false when it does not exist or
    /// belongs to someone else
    async fn mark_read(&self, recipient_id: Snowflake, id: Snowflake) -> RepoResult<bool>;

    /// Mark every unread notification for a recipient as read
    async fn mark_all_read(&self, recipient_id: Snowflake) -> RepoResult<u64>;

    /// Delete one notification; false when it does not exist or belongs
    /// to someone else
    async fn delete(&self, recipient_id: Snowflake, id: Snowflake) -> RepoResult<bool>;
}
