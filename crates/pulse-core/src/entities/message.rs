//! Message entity - a direct message between two users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Delivery status of a direct message
///
/// Transitions are monotonic: `Sent → Delivered → Read`. `Delivered` may
/// be skipped when the recipient reads immediately; regressions are
/// refused everywhere (entity, store, and wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Persisted, recipient not yet reached
    Sent,
    /// Pushed to at least one live connection of the recipient
    Delivered,
    /// Recipient marked the message as read
    Read,
}

impl DeliveryStatus {
    /// Ordering rank used for the monotonicity check
    #[inline]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Sent => 0,
            Self::Delivered => 1,
            Self::Read => 2,
        }
    }

    /// Whether transitioning to `next` moves status strictly forward
    #[inline]
    pub fn can_transition_to(self, next: Self) -> bool {
        next.rank() > self.rank()
    }

    /// Stable string form used in the database
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "read" => Ok(Self::Read),
            other => Err(format!("invalid delivery status: {other}")),
        }
    }
}

/// Message entity
///
/// Immutable once persisted except for the status transition fields.
/// The client-supplied correlation token is deliberately absent: it is a
/// wire-level acknowledgment key, never persisted as identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub sender_id: Snowflake,
    pub recipient_id: Snowflake,
    pub content: String,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a new message in the `Sent` state
    pub fn new(id: Snowflake, sender_id: Snowflake, recipient_id: Snowflake, content: String) -> Self {
        Self {
            id,
            sender_id,
            recipient_id,
            content,
            status: DeliveryStatus::Sent,
            created_at: Utc::now(),
            read_at: None,
        }
    }

    /// Apply a status transition, refusing regressions.
    ///
    /// Returns true when the status actually advanced.
    pub fn transition(&mut self, next: DeliveryStatus, at: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        if next == DeliveryStatus::Read {
            self.read_at = Some(at);
        }
        true
    }

    /// Check if message content is empty after trimming
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Per-peer conversation summary: last message plus unread count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub peer_id: Snowflake,
    pub last_message: Message,
    pub unread_count: i64,
}
