//! Notification database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use pulse_core::entities::{Notification, NotificationKind};
use pulse_core::Snowflake;

/// Database model for the `notifications` table
#[derive(Debug, Clone, FromRow)]
pub struct NotificationModel {
    pub id: i64,
    pub recipient_id: i64,
    pub actor_id: i64,
    pub kind: String,
    pub message: String,
    pub post_id: Option<i64>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationModel> for Notification {
    fn from(model: NotificationModel) -> Self {
        Notification {
            id: Snowflake::new(model.id),
            recipient_id: Snowflake::new(model.recipient_id),
            actor_id: Snowflake::new(model.actor_id),
            kind: model.kind.parse().unwrap_or(NotificationKind::Comment),
            message: model.message,
            post_id: model.post_id.map(Snowflake::new),
            read: model.read,
            created_at: model.created_at,
        }
    }
}
