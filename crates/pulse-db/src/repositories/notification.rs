//! PostgreSQL implementation of the notification store

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use pulse_core::entities::Notification;
use pulse_core::traits::{NotificationRepository, RepoResult};
use pulse_core::Snowflake;

use crate::models::NotificationModel;

use super::error::map_db_error;

/// PostgreSQL implementation of `NotificationRepository`
///
/// Every mutation is scoped to the recipient: a notification can only be
/// read or deleted by the user it was addressed to.
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    /// Create a new `PgNotificationRepository`
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    #[instrument(skip(self, notification), fields(notification_id = %notification.id))]
    async fn create(&self, notification: &Notification) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient_id, actor_id, kind, message, post_id, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(notification.id.into_inner())
        .bind(notification.recipient_id.into_inner())
        .bind(notification.actor_id.into_inner())
        .bind(notification.kind.as_str())
        .bind(&notification.message)
        .bind(notification.post_id.map(Snowflake::into_inner))
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_by_recipient(
        &self,
        recipient_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<Notification>> {
        let results = sqlx::query_as::<_, NotificationModel>(
            r#"
            SELECT id, recipient_id, actor_id, kind, message, post_id, read, created_at
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(recipient_id.into_inner())
        .bind(limit.clamp(1, 100))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Notification::from).collect())
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, recipient_id: Snowflake, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE id = $1 AND recipient_id = $2
            "#,
        )
        .bind(id.into_inner())
        .bind(recipient_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_all_read(&self, recipient_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE recipient_id = $1 AND read = FALSE
            "#,
        )
        .bind(recipient_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete(&self, recipient_id: Snowflake, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE id = $1 AND recipient_id = $2
            "#,
        )
        .bind(id.into_inner())
        .bind(recipient_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
