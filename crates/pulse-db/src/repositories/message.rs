//! PostgreSQL implementation of the message store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use pulse_core::entities::{ConversationSummary, DeliveryStatus, Message};
use pulse_core::traits::{MessageRepository, RepoResult};
use pulse_core::Snowflake;

use crate::models::MessageModel;

use super::error::map_db_error;

/// PostgreSQL implementation of `MessageRepository`
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new `PgMessageRepository`
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape for the per-peer last-message query
#[derive(Debug, FromRow)]
struct ConversationRow {
    peer_id: i64,
    id: i64,
    sender_id: i64,
    recipient_id: i64,
    content: String,
    status: String,
    created_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
}

/// Row shape for the per-peer unread-count query
#[derive(Debug, FromRow)]
struct UnreadRow {
    sender_id: i64,
    unread: i64,
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, recipient_id, content, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id.into_inner())
        .bind(message.sender_id.into_inner())
        .bind(message.recipient_id.into_inner())
        .bind(&message.content)
        .bind(message.status.as_str())
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT id, sender_id, recipient_id, content, status, created_at, read_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    /// Monotonicity is enforced in SQL: the row is only touched when the
    /// new status ranks strictly above the stored one, so concurrent
    /// transitions can never regress a message.
    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: Snowflake,
        status: DeliveryStatus,
        read_at: Option<DateTime<Utc>>,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET status = $2, read_at = COALESCE($3, read_at)
            WHERE id = $1
              AND (CASE status WHEN 'sent' THEN 0 WHEN 'delivered' THEN 1 ELSE 2 END)
                < (CASE $2 WHEN 'sent' THEN 0 WHEN 'delivered' THEN 1 ELSE 2 END)
            "#,
        )
        .bind(id.into_inner())
        .bind(status.as_str())
        .bind(read_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list_conversation(&self, a: Snowflake, b: Snowflake) -> RepoResult<Vec<Message>> {
        let results = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT id, sender_id, recipient_id, content, status, created_at, read_at
            FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(a.into_inner())
        .bind(b.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_conversation_summaries(
        &self,
        user_id: Snowflake,
    ) -> RepoResult<Vec<ConversationSummary>> {
        let last_messages = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT DISTINCT ON (peer_id)
                CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END AS peer_id,
                id, sender_id, recipient_id, content, status, created_at, read_at
            FROM messages
            WHERE sender_id = $1 OR recipient_id = $1
            ORDER BY peer_id, created_at DESC, id DESC
            "#,
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let unread_rows = sqlx::query_as::<_, UnreadRow>(
            r#"
            SELECT sender_id, COUNT(*) AS unread
            FROM messages
            WHERE recipient_id = $1 AND status <> 'read'
            GROUP BY sender_id
            "#,
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let unread_by_peer: HashMap<i64, i64> = unread_rows
            .into_iter()
            .map(|row| (row.sender_id, row.unread))
            .collect();

        let mut summaries: Vec<ConversationSummary> = last_messages
            .into_iter()
            .map(|row| {
                let unread_count = unread_by_peer.get(&row.peer_id).copied().unwrap_or(0);
                ConversationSummary {
                    peer_id: Snowflake::new(row.peer_id),
                    last_message: Message::from(MessageModel {
                        id: row.id,
                        sender_id: row.sender_id,
                        recipient_id: row.recipient_id,
                        content: row.content,
                        status: row.status,
                        created_at: row.created_at,
                        read_at: row.read_at,
                    }),
                    unread_count,
                }
            })
            .collect();

        // Most recently active conversation first
        summaries.sort_by(|a, b| b.last_message.created_at.cmp(&a.last_message.created_at));

        Ok(summaries)
    }
}
