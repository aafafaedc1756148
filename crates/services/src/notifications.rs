//! # Notification Feed
//!
//! Polled per-user inbox. Rows are written by the booking and review flows;
//! readers can only flip `is_read`.

use std::sync::Arc;

use tracing::debug;

use domains::{Identity, Notification, NotificationRepo, Result};

/// Maximum (and default) page size of the feed.
pub const FEED_LIMIT: i64 = 50;

pub struct NotificationService {
    notifications: Arc<dyn NotificationRepo>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationRepo>) -> Self {
        Self { notifications }
    }

    /// Newest first, at most [`FEED_LIMIT`] entries.
    pub async fn list(&self, identity: &Identity, limit: Option<i64>) -> Result<Vec<Notification>> {
        let limit = limit.unwrap_or(FEED_LIMIT).clamp(1, FEED_LIMIT);
        self.notifications.list_notifications(identity.user_id, limit).await
    }

    /// Unknown ids and other users' notifications are silently ignored.
    pub async fn mark_read(&self, identity: &Identity, notification_id: i64) -> Result<()> {
        let updated = self.notifications.mark_read(notification_id, identity.user_id).await?;
        if !updated {
            debug!(notification_id, user_id = identity.user_id, "mark_read matched nothing");
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, identity: &Identity) -> Result<u64> {
        self.notifications.mark_all_read(identity.user_id).await
    }

    pub async fn unread_count(&self, identity: &Identity) -> Result<i64> {
        self.notifications.unread_count(identity.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockNotificationRepo, Role};
    use mockall::predicate::eq;

    fn identity() -> Identity {
        Identity { user_id: 3, role: Role::User }
    }

    #[tokio::test]
    async fn test_list_defaults_and_caps_the_limit() {
        let mut repo = MockNotificationRepo::new();
        repo.expect_list_notifications()
            .with(eq(3), eq(FEED_LIMIT))
            .times(2)
            .returning(|_, _| Ok(Vec::new()));
        repo.expect_list_notifications()
            .with(eq(3), eq(1))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        let feed = NotificationService::new(Arc::new(repo));

        feed.list(&identity(), None).await.unwrap();
        feed.list(&identity(), Some(500)).await.unwrap();
        feed.list(&identity(), Some(0)).await.unwrap();
    }

    #[tokio::test]
    async fn test_mark_read_of_foreign_notification_is_not_an_error() {
        let mut repo = MockNotificationRepo::new();
        repo.expect_mark_read().with(eq(99), eq(3)).returning(|_, _| Ok(false));
        let feed = NotificationService::new(Arc::new(repo));

        assert!(feed.mark_read(&identity(), 99).await.is_ok());
    }
}
