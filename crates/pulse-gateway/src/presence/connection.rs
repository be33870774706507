//! Individual WebSocket connection
//!
//! A connection is created only after the credential has been verified,
//! so the identity is immutable for its whole lifetime.

use std::sync::Arc;

use tokio::sync::mpsc;

use pulse_core::Snowflake;

use crate::protocol::ServerEvent;

/// A single authenticated WebSocket connection
pub struct Connection {
    /// Unique session ID
    session_id: String,

    /// Authenticated user
    user_id: Snowflake,
    username: String,

    /// Bounded channel to the socket writer task
    sender: mpsc::Sender<ServerEvent>,
}

impl Connection {
    /// Create a new connection
    pub fn new(
        session_id: String,
        user_id: Snowflake,
        username: String,
        sender: mpsc::Sender<ServerEvent>,
    ) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            user_id,
            username,
            sender,
        })
    }

    /// Get the session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Get the authenticated user ID
    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    /// Get the authenticated username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Try to enqueue an event without blocking.
    ///
    /// Returns false when the buffer is full or the writer is gone; the
    /// event is dropped, never the connection.
    pub fn try_send(&self, event: ServerEvent) -> bool {
        self.sender.try_send(event).is_ok()
    }

    /// Check if the writer side is gone
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .finish()
    }
}
