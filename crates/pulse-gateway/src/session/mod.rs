//! Conversation sessions
//!
//! Per-connection lifecycle and frame processing.

mod error;
mod session;

pub use error::{SessionError, SessionResult};
pub use session::{decode_frame, ConversationSession, SessionState};
