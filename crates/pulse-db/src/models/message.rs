//! Message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use pulse_core::entities::{DeliveryStatus, Message};
use pulse_core::Snowflake;

/// Database model for the `messages` table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub content: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            sender_id: Snowflake::new(model.sender_id),
            recipient_id: Snowflake::new(model.recipient_id),
            content: model.content,
            // Unknown values cannot round-trip; treat them as freshly sent
            status: model.status.parse().unwrap_or(DeliveryStatus::Sent),
            created_at: model.created_at,
            read_at: model.read_at,
        }
    }
}
