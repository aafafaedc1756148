use async_trait::async_trait;
use sqlx::Row;

use domains::{
    AppError, NewNotification, NewReview, RatingAggregate, Result, Review, ReviewRepo,
};

use crate::notifications::insert_notification;
use crate::rows;
use crate::{internal, write_error, SqliteStore};

#[async_trait]
impl ReviewRepo for SqliteStore {
    async fn get_review_by_booking(&self, booking_id: i64) -> Result<Option<Review>> {
        sqlx::query("SELECT * FROM reviews WHERE booking_id = ?")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .map(|row| rows::review(&row))
            .transpose()
            .map_err(internal)
    }

    async fn find_review(&self, booking_id: i64, user_id: i64) -> Result<Option<Review>> {
        sqlx::query("SELECT * FROM reviews WHERE booking_id = ? AND user_id = ?")
            .bind(booking_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .map(|row| rows::review(&row))
            .transpose()
            .map_err(internal)
    }

    async fn create_review(
        &self,
        review: NewReview,
        notification: NewNotification,
    ) -> Result<Review> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        // 1. Insert review; booking_id is unique
        let row = sqlx::query(
            "INSERT INTO reviews (booking_id, user_id, provider_id, rating, feedback, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(review.booking_id)
        .bind(review.user_id)
        .bind(review.provider_id)
        .bind(review.rating)
        .bind(&review.feedback)
        .bind(review.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_error("Review already submitted"))?;
        let created = rows::review(&row).map_err(internal)?;

        // 2. Notify the provider
        insert_notification(&mut tx, notification).await?;

        tx.commit().await.map_err(internal)?;
        Ok(created)
    }

    async fn update_review(&self, id: i64, rating: f64, feedback: Option<String>) -> Result<Review> {
        let row = sqlx::query("UPDATE reviews SET rating = ?, feedback = ? WHERE id = ? RETURNING *")
            .bind(rating)
            .bind(&feedback)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .ok_or_else(|| AppError::not_found("Review", id))?;

        rows::review(&row).map_err(internal)
    }

    async fn list_for_provider(&self, provider_id: i64) -> Result<Vec<Review>> {
        let found = sqlx::query(
            "SELECT * FROM reviews WHERE provider_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        rows::all(found, rows::review).map_err(internal)
    }

    async fn rating_aggregate(&self, provider_id: i64) -> Result<RatingAggregate> {
        let row = sqlx::query(
            "SELECT AVG(rating) AS average, COUNT(id) AS count FROM reviews WHERE provider_id = ?",
        )
        .bind(provider_id)
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;

        Ok(RatingAggregate {
            average: row.try_get("average").map_err(internal)?,
            count: row.try_get("count").map_err(internal)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::tests::completed_bookings;
    use crate::testing;
    use chrono::{Duration, Utc};
    use domains::{NotificationRepo, Role};

    fn review_of(booking_id: i64, user_id: i64, provider_id: i64, rating: f64) -> NewReview {
        NewReview {
            booking_id,
            user_id,
            provider_id,
            rating,
            feedback: Some("Great".into()),
            created_at: Utc::now() - Duration::hours(2),
        }
    }

    fn heads_up(provider_id: i64) -> NewNotification {
        NewNotification {
            user_id: provider_id,
            title: "New Review Received".into(),
            message: "alice gave you a 5.0 star rating.".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_one_review_per_booking() {
        let store = testing::store().await;
        let alice = testing::user(&store, "alice@example.com", Role::User).await;
        let bob = testing::user(&store, "bob@example.com", Role::Provider).await;
        let ids = completed_bookings(&store, &alice, &bob, 1).await;
        let before = store.unread_count(bob.id).await.unwrap();

        store
            .create_review(review_of(ids[0], alice.id, bob.id, 5.0), heads_up(bob.id))
            .await
            .unwrap();
        let err = store
            .create_review(review_of(ids[0], alice.id, bob.id, 1.0), heads_up(bob.id))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.unread_count(bob.id).await.unwrap(), before + 1);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let store = testing::store().await;
        let alice = testing::user(&store, "alice@example.com", Role::User).await;
        let bob = testing::user(&store, "bob@example.com", Role::Provider).await;
        let ids = completed_bookings(&store, &alice, &bob, 1).await;
        let review = store
            .create_review(review_of(ids[0], alice.id, bob.id, 5.0), heads_up(bob.id))
            .await
            .unwrap();

        let edited = store.update_review(review.id, 3.5, None).await.unwrap();
        assert_eq!(edited.rating, 3.5);
        assert_eq!(edited.feedback, None);
        assert_eq!(edited.created_at, review.created_at);
    }

    #[tokio::test]
    async fn test_aggregate_without_reviews() {
        let store = testing::store().await;
        let bob = testing::user(&store, "bob@example.com", Role::Provider).await;
        let aggregate = store.rating_aggregate(bob.id).await.unwrap();
        assert_eq!(aggregate, RatingAggregate { average: None, count: 0 });
    }
}
