//! Notification entity - fan-out record for mentions, comments and reactions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Kind of event that produced a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Mention,
    Comment,
    Reaction,
    Follow,
}

impl NotificationKind {
    /// Stable string form used in the database
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mention => "mention",
            Self::Comment => "comment",
            Self::Reaction => "reaction",
            Self::Follow => "follow",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mention" => Ok(Self::Mention),
            "comment" => Ok(Self::Comment),
            "reaction" => Ok(Self::Reaction),
            "follow" => Ok(Self::Follow),
            other => Err(format!("invalid notification kind: {other}")),
        }
    }
}

/// Notification entity
///
/// Created by the fanout engine; the recipient exclusively controls the
/// read flag and deletion afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Snowflake,
    pub recipient_id: Snowflake,
    pub actor_id: Snowflake,
    pub kind: NotificationKind,
    pub message: String,
    pub post_id: Option<Snowflake>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a new unread notification
    pub fn new(
        id: Snowflake,
        recipient_id: Snowflake,
        actor_id: Snowflake,
        kind: NotificationKind,
        message: String,
        post_id: Option<Snowflake>,
    ) -> Self {
        Self {
            id,
            recipient_id,
            actor_id,
            kind,
            message,
            post_id,
            read: false,
            created_at: Utc::now(),
        }
    }
}
