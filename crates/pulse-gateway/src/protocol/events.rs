//! Gateway event vocabulary
//!
//! Two closed, internally tagged enums: `ClientEvent` for frames the
//! client may send, `ServerEvent` for frames the gateway may send. A
//! frame whose `type` is not in the vocabulary fails to decode; there is
//! no passthrough.
//!
//! `send_message` fields are deliberately lenient (`String` /
//! `Option<String>`) so that a missing recipient or token becomes a
//! `message_error` keyed by the correlation token instead of a decode
//! failure.

use serde::{Deserialize, Serialize};

use pulse_core::Snowflake;

use super::payloads::{MessagePayload, NotificationPayload, OnlineUser};

/// Frames accepted from the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Send a direct message to a recipient
    #[serde(rename_all = "camelCase")]
    SendMessage {
        #[serde(default)]
        recipient: String,
        #[serde(default)]
        content: String,
        #[serde(default)]
        correlation_token: Option<String>,
    },

    /// The client started (or continues) typing toward a recipient
    Typing { recipient: Snowflake },

    /// The client explicitly stopped typing toward a recipient
    StopTyping { recipient: Snowflake },

    /// The client read a message it received
    #[serde(rename_all = "camelCase")]
    MarkRead { message_id: Snowflake },
}

/// Frames the gateway sends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A new message addressed to this connection's user
    MessageReceived { message: MessagePayload },

    /// Acknowledgment of a `send_message`, echoing the correlation token
    #[serde(rename_all = "camelCase")]
    MessageSent {
        correlation_token: String,
        message: MessagePayload,
    },

    /// A `send_message` was rejected; the token is echoed when present
    #[serde(rename_all = "camelCase")]
    MessageError {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        correlation_token: Option<String>,
        reason: String,
    },

    /// A message this user sent reached the recipient live
    #[serde(rename_all = "camelCase")]
    MessageDelivered { message_id: Snowflake },

    /// A message this user sent was read by its recipient
    #[serde(rename_all = "camelCase")]
    MessageRead {
        message_id: Snowflake,
        read_by: Snowflake,
    },

    /// A peer started typing toward this user
    #[serde(rename_all = "camelCase")]
    UserTyping {
        user_id: Snowflake,
        username: String,
    },

    /// A peer stopped typing toward this user
    #[serde(rename_all = "camelCase")]
    UserStopTyping { user_id: Snowflake },

    /// Full snapshot of everyone currently online
    UsersOnline { users: Vec<OnlineUser> },

    /// A freshly created notification for this user
    Notification { notification: NotificationPayload },
}

impl ServerEvent {
    /// Shorthand for a `message_error` frame
    #[must_use]
    pub fn error(correlation_token: Option<String>, reason: impl Into<String>) -> Self {
        Self::MessageError {
            correlation_token,
            reason: reason.into(),
        }
    }
}
