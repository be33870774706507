//! Conversation session
//!
//! One session per WebSocket connection. Owns the connection's lifecycle
//! in the presence registry and drives every client frame through the
//! messaging service, the typing coordinator, and recipient routing.
//!
//! All routing is server-authoritative: the recipient of every outbound
//! event is derived from authenticated identities and stored message
//! rows, never from client-supplied session addresses.

use std::sync::Arc;

use tracing::{debug, info, warn};

use pulse_core::Snowflake;
use pulse_service::{MessagingService, ServiceContext, ServiceError};

use crate::presence::{Connection, PresenceRegistry};
use crate::protocol::{ClientEvent, MessagePayload, ServerEvent};
use crate::typing::TypingCoordinator;

use super::error::{SessionError, SessionResult};

/// Decode one text frame into a client event.
///
/// Anything outside the closed inbound vocabulary is an
/// `InvalidPayload`; the caller closes the connection with the mapped
/// close code.
pub fn decode_frame(text: &str) -> SessionResult<ClientEvent> {
    serde_json::from_str(text).map_err(|e| SessionError::InvalidPayload(e.to_string()))
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Socket upgraded, not yet visible in the registry
    Connecting,
    /// Registered and processing frames
    Active,
    /// Torn down; frames are ignored
    Closed,
}

impl SessionState {
    /// Check whether a lifecycle transition is allowed
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Connecting, Self::Active)
                | (Self::Connecting, Self::Closed)
                | (Self::Active, Self::Closed)
        )
    }
}

/// Per-connection session
pub struct ConversationSession {
    connection: Arc<Connection>,
    registry: Arc<PresenceRegistry>,
    typing: Arc<TypingCoordinator>,
    ctx: Arc<ServiceContext>,
    state: SessionState,
}

impl ConversationSession {
    /// Create a session for an authenticated connection
    pub fn new(
        connection: Arc<Connection>,
        registry: Arc<PresenceRegistry>,
        typing: Arc<TypingCoordinator>,
        ctx: Arc<ServiceContext>,
    ) -> Self {
        Self {
            connection,
            registry,
            typing,
            ctx,
            state: SessionState::Connecting,
        }
    }

    /// Register the connection and start processing frames
    pub fn activate(&mut self) {
        if !self.state.can_transition_to(SessionState::Active) {
            return;
        }
        self.registry.register(self.connection.clone());
        self.state = SessionState::Active;

        info!(
            session_id = %self.connection.session_id(),
            user_id = %self.user_id(),
            username = %self.connection.username(),
            "Session active"
        );
    }

    /// Tear the session down: cancel typing state, deregister.
    ///
    /// Idempotent; a second close is a no-op.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        let was_active = self.state == SessionState::Active;
        self.state = SessionState::Closed;

        if was_active {
            self.typing.disconnect(self.user_id());
            self.registry.unregister(self.connection.session_id());
        }

        info!(
            session_id = %self.connection.session_id(),
            user_id = %self.user_id(),
            "Session closed"
        );
    }

    /// Get the current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn user_id(&self) -> Snowflake {
        self.connection.user_id()
    }

    /// Process one client frame.
    ///
    /// Never fails: every rejection is reported to the client as a
    /// `message_error` event and the session stays open.
    pub async fn handle_event(&mut self, event: ClientEvent) {
        if self.state != SessionState::Active {
            debug!(
                session_id = %self.connection.session_id(),
                state = ?self.state,
                "Frame ignored outside active state"
            );
            return;
        }

        match event {
            ClientEvent::SendMessage {
                recipient,
                content,
                correlation_token,
            } => {
                self.handle_send_message(recipient, content, correlation_token)
                    .await;
            }
            ClientEvent::Typing { recipient } => {
                self.typing
                    .typing(self.user_id(), self.connection.username(), recipient);
            }
            ClientEvent::StopTyping { recipient } => {
                self.typing.stop_typing(self.user_id(), recipient);
            }
            ClientEvent::MarkRead { message_id } => self.handle_mark_read(message_id).await,
        }
    }

    /// Validate, persist, acknowledge, and route a direct message.
    ///
    /// Every rejection becomes a `message_error` keyed by the
    /// correlation token; the connection stays open.
    async fn handle_send_message(
        &self,
        recipient: String,
        content: String,
        correlation_token: Option<String>,
    ) {
        let Some(token) = correlation_token.filter(|t| !t.is_empty()) else {
            self.send(ServerEvent::error(None, "Missing correlation token"));
            return;
        };

        if recipient.is_empty() {
            self.send(ServerEvent::error(Some(token), "Missing recipient"));
            return;
        }
        let Ok(recipient_id) = Snowflake::parse(&recipient) else {
            self.send(ServerEvent::error(Some(token), "Invalid recipient"));
            return;
        };

        let service = MessagingService::new(&self.ctx);
        let sender_id = self.user_id();

        let message = match service.send_message(sender_id, recipient_id, &content).await {
            Ok(message) => message,
            Err(ServiceError::Validation(reason)) => {
                self.send(ServerEvent::error(Some(token), reason));
                return;
            }
            Err(e) => {
                warn!(
                    session_id = %self.connection.session_id(),
                    error = %e,
                    "Failed to persist message"
                );
                self.send(ServerEvent::error(Some(token), "Failed to send message"));
                return;
            }
        };

        // Sending implies the sender stopped typing toward the recipient
        self.typing.stop_typing(sender_id, recipient_id);

        // Acknowledge first, regardless of recipient presence
        self.send(ServerEvent::MessageSent {
            correlation_token: token,
            message: MessagePayload::from(&message),
        });

        let delivered = self.registry.route_to(
            recipient_id,
            ServerEvent::MessageReceived {
                message: MessagePayload::from(&message),
            },
        );

        if delivered {
            match service.mark_delivered(message.id).await {
                Ok(true) => {
                    self.send(ServerEvent::MessageDelivered {
                        message_id: message.id,
                    });
                }
                Ok(false) => {
                    // Already past delivered (instant read); nothing to report
                }
                Err(e) => {
                    // The push already happened; log once, no retry
                    warn!(
                        message_id = %message.id,
                        error = %e,
                        "Delivered transition failed after push"
                    );
                }
            }
        }
    }

    /// Mark a message read and route the receipt to its sender
    async fn handle_mark_read(&self, message_id: Snowflake) {
        let service = MessagingService::new(&self.ctx);

        match service.mark_read(self.user_id(), message_id).await {
            Ok(Some(receipt)) => {
                self.registry.route_to(
                    receipt.sender_id,
                    ServerEvent::MessageRead {
                        message_id: receipt.message_id,
                        read_by: receipt.read_by,
                    },
                );
            }
            Ok(None) => {
                debug!(message_id = %message_id, "Read transition was a no-op");
            }
            Err(e @ (ServiceError::NotFound { .. } | ServiceError::Validation(_))) => {
                debug!(
                    message_id = %message_id,
                    user_id = %self.user_id(),
                    error = %e,
                    "Read request rejected"
                );
            }
            Err(e) => {
                warn!(message_id = %message_id, error = %e, "Read transition failed");
                self.send(ServerEvent::error(None, "Failed to mark message read"));
            }
        }
    }

    /// Enqueue an event on this connection, dropping on a full buffer
    fn send(&self, event: ServerEvent) {
        if !self.connection.try_send(event) {
            warn!(
                session_id = %self.connection.session_id(),
                "Outbound buffer full, event dropped"
            );
        }
    }
}

impl std::fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSession")
            .field("session_id", &self.connection.session_id())
            .field("user_id", &self.connection.user_id())
            .field("state", &self.state)
            .finish()
    }
}
