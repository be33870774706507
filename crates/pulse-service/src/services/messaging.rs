//! Messaging service
//!
//! Persistence workflow behind the conversation session: append-only
//! sends, monotonic status transitions, and conversation queries.

use chrono::Utc;
use tracing::{debug, info, instrument};

use pulse_core::entities::{ConversationSummary, DeliveryStatus, Message};
use pulse_core::Snowflake;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Outcome of a successful read transition, enough for the session to
/// route a receipt back to the sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadReceipt {
    pub message_id: Snowflake,
    pub sender_id: Snowflake,
    pub read_by: Snowflake,
}

/// Messaging service
pub struct MessagingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessagingService<'a> {
    /// Create a new `MessagingService`
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Validate and persist an outgoing message with status `sent`.
    ///
    /// The correlation token never reaches this layer; it is a wire-only
    /// acknowledgment key handled by the session.
    #[instrument(skip(self, content))]
    pub async fn send_message(
        &self,
        sender_id: Snowflake,
        recipient_id: Snowflake,
        content: &str,
    ) -> ServiceResult<Message> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ServiceError::validation("Message content is empty"));
        }

        let message = Message::new(
            self.ctx.generate_id(),
            sender_id,
            recipient_id,
            content.to_string(),
        );

        self.ctx.message_repo().create(&message).await?;

        info!(
            message_id = %message.id,
            sender_id = %sender_id,
            recipient_id = %recipient_id,
            "Message persisted"
        );

        Ok(message)
    }

    /// Advance a message to `delivered` after a successful live push.
    ///
    /// Returns false when the message was already delivered or read;
    /// the store refuses regressions.
    #[instrument(skip(self))]
    pub async fn mark_delivered(&self, message_id: Snowflake) -> ServiceResult<bool> {
        let advanced = self
            .ctx
            .message_repo()
            .update_status(message_id, DeliveryStatus::Delivered, None)
            .await?;

        Ok(advanced)
    }

    /// Mark a message as read by its recipient.
    ///
    /// Idempotent: returns `Ok(None)` when the message was already read
    /// (including a concurrent `mark_read` winning the race). Only the
    /// recipient may mark a message read.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        reader_id: Snowflake,
        message_id: Snowflake,
    ) -> ServiceResult<Option<ReadReceipt>> {
        let message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Message", message_id.to_string()))?;

        if message.recipient_id != reader_id {
            return Err(ServiceError::validation(
                "Only the recipient can mark a message as read",
            ));
        }

        if message.status == DeliveryStatus::Read {
            debug!(message_id = %message_id, "Message already read");
            return Ok(None);
        }

        let advanced = self
            .ctx
            .message_repo()
            .update_status(message_id, DeliveryStatus::Read, Some(Utc::now()))
            .await?;

        if !advanced {
            // Lost a concurrent mark_read race; treat as already read
            return Ok(None);
        }

        Ok(Some(ReadReceipt {
            message_id,
            sender_id: message.sender_id,
            read_by: reader_id,
        }))
    }

    /// All messages between two users, chronological
    #[instrument(skip(self))]
    pub async fn conversation(
        &self,
        user_id: Snowflake,
        peer_id: Snowflake,
    ) -> ServiceResult<Vec<Message>> {
        Ok(self
            .ctx
            .message_repo()
            .list_conversation(user_id, peer_id)
            .await?)
    }

    /// Per-peer last message and unread count, most recent first
    #[instrument(skip(self))]
    pub async fn conversation_summaries(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<ConversationSummary>> {
        Ok(self
            .ctx
            .message_repo()
            .list_conversation_summaries(user_id)
            .await?)
    }
}
