//! Gateway wire protocol
//!
//! Event vocabulary, shared payloads, and close codes.

mod close_codes;
mod events;
mod payloads;

pub use close_codes::CloseCode;
pub use events::{ClientEvent, ServerEvent};
pub use payloads::{MessagePayload, NotificationPayload, OnlineUser};
