use async_trait::async_trait;
use sqlx::SqliteConnection;

use domains::{NewNotification, Notification, NotificationRepo, Result};

use crate::rows;
use crate::{internal, SqliteStore};

/// Appends a notification on an open connection or transaction.
pub(crate) async fn insert_notification(
    conn: &mut SqliteConnection,
    notification: NewNotification,
) -> Result<()> {
    sqlx::query("INSERT INTO notifications (user_id, title, message, created_at) VALUES (?, ?, ?, ?)")
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.created_at)
        .execute(&mut *conn)
        .await
        .map_err(internal)?;
    Ok(())
}

#[async_trait]
impl NotificationRepo for SqliteStore {
    async fn list_notifications(&self, user_id: i64, limit: i64) -> Result<Vec<Notification>> {
        let found = sqlx::query(
            "SELECT * FROM notifications
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        rows::all(found, rows::notification).map_err(internal)
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(internal)?;
        Ok(result.rows_affected())
    }

    async fn unread_count(&self, user_id: i64) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(id) FROM notifications WHERE user_id = ? AND is_read = 0")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use chrono::{Duration, TimeZone, Utc};
    use domains::Role;

    async fn notify(store: &SqliteStore, user_id: i64, title: &str, minute: i64) {
        let mut conn = store.pool().acquire().await.unwrap();
        insert_notification(
            &mut conn,
            NewNotification {
                user_id,
                title: title.into(),
                message: format!("{title} body"),
                created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
                    + Duration::minutes(minute),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_feed_is_newest_first_and_limited() {
        let store = testing::store().await;
        let bob = testing::user(&store, "bob@example.com", Role::Provider).await;
        for (minute, title) in ["first", "second", "third"].into_iter().enumerate() {
            notify(&store, bob.id, title, minute as i64).await;
        }

        let feed = store.list_notifications(bob.id, 2).await.unwrap();
        let titles: Vec<_> = feed.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["third", "second"]);
    }

    #[tokio::test]
    async fn test_read_state_is_scoped_to_the_owner() {
        let store = testing::store().await;
        let alice = testing::user(&store, "alice@example.com", Role::User).await;
        let bob = testing::user(&store, "bob@example.com", Role::Provider).await;
        notify(&store, bob.id, "for bob", 0).await;
        notify(&store, bob.id, "for bob again", 1).await;

        let id = store.list_notifications(bob.id, 50).await.unwrap()[0].id;
        assert!(!store.mark_read(id, alice.id).await.unwrap());
        assert!(store.mark_read(id, bob.id).await.unwrap());
        assert_eq!(store.unread_count(bob.id).await.unwrap(), 1);

        assert_eq!(store.mark_all_read(bob.id).await.unwrap(), 1);
        assert_eq!(store.mark_all_read(bob.id).await.unwrap(), 0);
        assert_eq!(store.unread_count(bob.id).await.unwrap(), 0);
    }
}
