//! Database models with SQLx `FromRow` derives and entity mappers

mod message;
mod notification;
mod user;

pub use message::MessageModel;
pub use notification::NotificationModel;
pub use user::UserModel;
