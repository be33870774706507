//! Wire payloads
//!
//! JSON shapes shared by several events. Field names are camelCase on
//! the wire; IDs travel as strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulse_core::entities::{DeliveryStatus, Message, Notification, NotificationKind};
use pulse_core::Snowflake;

/// A direct message as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: Snowflake,
    pub sender: Snowflake,
    pub recipient: Snowflake,
    pub content: String,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

impl From<&Message> for MessagePayload {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            sender: message.sender_id,
            recipient: message.recipient_id,
            content: message.content.clone(),
            status: message.status,
            created_at: message.created_at,
            read_at: message.read_at,
        }
    }
}

/// A notification as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: Snowflake,
    pub actor: Snowflake,
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Snowflake>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationPayload {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            actor: notification.actor_id,
            kind: notification.kind,
            message: notification.message.clone(),
            post: notification.post_id,
            read: notification.read,
            created_at: notification.created_at,
        }
    }
}

/// One entry of the online-users snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUser {
    pub user_id: Snowflake,
    pub username: String,
}
