//! Session error types

use thiserror::Error;

use crate::protocol::CloseCode;

/// Errors that tear a conversation session down.
///
/// Service and store failures never appear here: those are reported to
/// the client as `message_error` events and the connection stays open.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Frame was not valid JSON or not in the event vocabulary
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl SessionError {
    /// Convert to the close code sent to the client
    #[must_use]
    pub fn to_close_code(&self) -> CloseCode {
        match self {
            Self::InvalidPayload(_) => CloseCode::DecodeError,
        }
    }
}

/// Session result type
pub type SessionResult<T> = Result<T, SessionError>;
