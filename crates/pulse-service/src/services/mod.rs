//! Application services

mod context;
mod error;
mod fanout;
mod messaging;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use fanout::{NotificationPush, NotificationService, NOTIFICATION_PAGE_LIMIT};
pub use messaging::{MessagingService, ReadReceipt};
