//! Notification fanout engine
//!
//! Resolves recipients for a triggering domain event (mention found in a
//! post or comment, comment posted, reaction posted), persists a
//! notification, and pushes it live when the recipient is present.
//! Persistence always comes first: a notification that cannot be stored
//! is never pushed.

use tracing::{debug, info, instrument, warn};

use pulse_core::entities::{Notification, NotificationKind};
use pulse_core::{extract_mentions, Snowflake};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Default page size for notification listings
pub const NOTIFICATION_PAGE_LIMIT: i64 = 50;

/// Live-push seam into the presence registry.
///
/// The push is best effort and never retried: `false` means the
/// recipient has no live connection (or every connection's buffer was
/// full) and will find the notification on their next poll.
pub trait NotificationPush: Send + Sync {
    fn push_notification(&self, recipient_id: Snowflake, notification: &Notification) -> bool;
}

/// Notification fanout engine
pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
    push: &'a dyn NotificationPush,
}

impl<'a> NotificationService<'a> {
    /// Create a new `NotificationService`
    pub fn new(ctx: &'a ServiceContext, push: &'a dyn NotificationPush) -> Self {
        Self { ctx, push }
    }

    /// Create a notification and push it live if the recipient is present.
    ///
    /// Returns `Ok(None)` when the notification was suppressed because a
    /// user never gets notified about their own action.
    #[instrument(skip(self, message))]
    pub async fn notify(
        &self,
        recipient_id: Snowflake,
        actor_id: Snowflake,
        kind: NotificationKind,
        message: String,
        post_id: Option<Snowflake>,
    ) -> ServiceResult<Option<Notification>> {
        if recipient_id == actor_id {
            debug!(user_id = %actor_id, kind = %kind, "Self-notification suppressed");
            return Ok(None);
        }

        let notification = Notification::new(
            self.ctx.generate_id(),
            recipient_id,
            actor_id,
            kind,
            message,
            post_id,
        );

        // Persist first; a failure here surfaces to the caller and the
        // live push is skipped entirely.
        self.ctx.notification_repo().create(&notification).await?;

        let pushed = self.push.push_notification(recipient_id, &notification);

        info!(
            notification_id = %notification.id,
            recipient_id = %recipient_id,
            actor_id = %actor_id,
            kind = %kind,
            pushed = pushed,
            "Notification created"
        );

        Ok(Some(notification))
    }

    /// Fan out `mention` notifications for a freshly created post.
    ///
    /// Each distinct `@name` in the body that resolves to a real user
    /// yields one notification; the author is excluded.
    #[instrument(skip(self, title, body))]
    pub async fn notify_post_mentions(
        &self,
        actor_id: Snowflake,
        title: &str,
        body: &str,
        post_id: Snowflake,
    ) -> ServiceResult<Vec<Notification>> {
        self.fan_out_mentions(actor_id, None, title, body, post_id, true)
            .await
    }

    /// Notify a post owner that someone commented on their post
    #[instrument(skip(self, title))]
    pub async fn notify_comment(
        &self,
        post_owner_id: Snowflake,
        actor_id: Snowflake,
        title: &str,
        post_id: Snowflake,
    ) -> ServiceResult<Option<Notification>> {
        self.notify(
            post_owner_id,
            actor_id,
            NotificationKind::Comment,
            format!("commented on your post: \"{title}\""),
            Some(post_id),
        )
        .await
    }

    /// Fan out `mention` notifications for a comment.
    ///
    /// The post owner is additionally excluded; they already received
    /// the `comment` notification for the same event.
    #[instrument(skip(self, title, body))]
    pub async fn notify_comment_mentions(
        &self,
        actor_id: Snowflake,
        post_owner_id: Snowflake,
        title: &str,
        body: &str,
        post_id: Snowflake,
    ) -> ServiceResult<Vec<Notification>> {
        self.fan_out_mentions(actor_id, Some(post_owner_id), title, body, post_id, false)
            .await
    }

    /// Notify a post owner about a reaction to their post
    #[instrument(skip(self, reaction, title))]
    pub async fn notify_reaction(
        &self,
        post_owner_id: Snowflake,
        actor_id: Snowflake,
        reaction: &str,
        title: &str,
        post_id: Snowflake,
    ) -> ServiceResult<Option<Notification>> {
        self.notify(
            post_owner_id,
            actor_id,
            NotificationKind::Reaction,
            format!("reacted {reaction} to your post: \"{title}\""),
            Some(post_id),
        )
        .await
    }

    async fn fan_out_mentions(
        &self,
        actor_id: Snowflake,
        exclude: Option<Snowflake>,
        title: &str,
        body: &str,
        post_id: Snowflake,
        in_post: bool,
    ) -> ServiceResult<Vec<Notification>> {
        let message = if in_post {
            format!("mentioned you in a post: \"{title}\"")
        } else {
            format!("mentioned you in a comment on \"{title}\"")
        };

        let mut created = Vec::new();

        for name in extract_mentions(body) {
            let Some(user) = self.ctx.user_repo().find_by_username(&name).await? else {
                debug!(username = %name, "Mention does not resolve to a user");
                continue;
            };

            if exclude == Some(user.id) {
                continue;
            }

            if let Some(notification) = self
                .notify(
                    user.id,
                    actor_id,
                    NotificationKind::Mention,
                    message.clone(),
                    Some(post_id),
                )
                .await?
            {
                created.push(notification);
            }
        }

        Ok(created)
    }

    // === Recipient-scoped queries and mutations ===

    /// Notifications for a recipient, newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        recipient_id: Snowflake,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<Notification>> {
        Ok(self
            .ctx
            .notification_repo()
            .list_by_recipient(recipient_id, limit.unwrap_or(NOTIFICATION_PAGE_LIMIT))
            .await?)
    }

    /// Mark one notification as read
    #[instrument(skip(self))]
    pub async fn mark_read(&self, recipient_id: Snowflake, id: Snowflake) -> ServiceResult<()> {
        if !self.ctx.notification_repo().mark_read(recipient_id, id).await? {
            return Err(ServiceError::not_found("Notification", id.to_string()));
        }
        Ok(())
    }

    /// Mark every unread notification for a recipient as read
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, recipient_id: Snowflake) -> ServiceResult<u64> {
        Ok(self.ctx.notification_repo().mark_all_read(recipient_id).await?)
    }

    /// Delete one notification
    #[instrument(skip(self))]
    pub async fn delete(&self, recipient_id: Snowflake, id: Snowflake) -> ServiceResult<()> {
        if !self.ctx.notification_repo().delete(recipient_id, id).await? {
            warn!(notification_id = %id, recipient_id = %recipient_id, "Delete missed");
            return Err(ServiceError::not_found("Notification", id.to_string()));
        }
        Ok(())
    }
}
