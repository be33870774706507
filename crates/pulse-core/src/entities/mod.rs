//! Domain entities

mod message;
mod notification;

pub use message::{ConversationSummary, DeliveryStatus, Message};
pub use notification::{Notification, NotificationKind};
