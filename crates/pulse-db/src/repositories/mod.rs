//! PostgreSQL repository implementations

mod error;
mod message;
mod notification;
mod user;

pub use error::map_db_error;
pub use message::PgMessageRepository;
pub use notification::PgNotificationRepository;
pub use user::PgUserRepository;
