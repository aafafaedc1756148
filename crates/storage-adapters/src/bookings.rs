use async_trait::async_trait;

use domains::{
    AppError, Booking, BookingDetails, BookingRepo, BookingStatus, NewBooking, NewNotification,
    Result, SideEffect,
};

use crate::calendar::insert_event;
use crate::notifications::insert_notification;
use crate::rows;
use crate::{internal, write_error, SqliteStore};

const SLOT_TAKEN: &str = "Provider already has a booking at that time";

/// Dashboard projection; `{counterpart}` is the column joined to `users`.
fn details_query(counterpart: &str, owner: &str) -> String {
    format!(
        "SELECT b.*, s.service_name AS service_name, u.name AS counterpart_name, r.rating AS review_rating
         FROM bookings b
         LEFT JOIN services s ON s.id = b.service_id
         LEFT JOIN users u ON u.id = b.{counterpart}
         LEFT JOIN reviews r ON r.booking_id = b.id
         WHERE b.{owner} = ?
         ORDER BY b.created_at DESC, b.id DESC"
    )
}

#[async_trait]
impl BookingRepo for SqliteStore {
    async fn find_active_booking(
        &self,
        provider_id: i64,
        booking_date: &str,
        booking_time: &str,
    ) -> Result<Option<Booking>> {
        sqlx::query(
            "SELECT * FROM bookings
             WHERE provider_id = ? AND booking_date = ? AND booking_time = ?
               AND status IN ('pending', 'accepted', 'ongoing')",
        )
        .bind(provider_id)
        .bind(booking_date)
        .bind(booking_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?
        .map(|row| rows::booking(&row))
        .transpose()
        .map_err(internal)
    }

    /// Atomic operation to create a booking and the provider's notification.
    async fn create_booking(
        &self,
        booking: NewBooking,
        notification: NewNotification,
    ) -> Result<Booking> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        // 1. Insert booking; the partial unique index rejects a taken slot
        let row = sqlx::query(
            "INSERT INTO bookings (user_id, provider_id, service_id, problem_description, booking_date, booking_time, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)
             RETURNING *",
        )
        .bind(booking.user_id)
        .bind(booking.provider_id)
        .bind(booking.service_id)
        .bind(&booking.problem_description)
        .bind(&booking.booking_date)
        .bind(&booking.booking_time)
        .bind(booking.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_error(SLOT_TAKEN))?;
        let created = rows::booking(&row).map_err(internal)?;

        // 2. Notify the provider
        insert_notification(&mut tx, notification).await?;

        tx.commit().await.map_err(internal)?;
        Ok(created)
    }

    async fn get_booking(&self, id: i64) -> Result<Option<Booking>> {
        sqlx::query("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .map(|row| rows::booking(&row))
            .transpose()
            .map_err(internal)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<BookingDetails>> {
        let found = sqlx::query(&details_query("provider_id", "user_id"))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        rows::all(found, rows::booking_details).map_err(internal)
    }

    async fn list_for_provider(&self, provider_id: i64) -> Result<Vec<BookingDetails>> {
        let found = sqlx::query(&details_query("user_id", "provider_id"))
            .bind(provider_id)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        rows::all(found, rows::booking_details).map_err(internal)
    }

    /// Compare-and-set on the status, then every side effect, in one transaction.
    async fn apply_transition(
        &self,
        booking_id: i64,
        from: BookingStatus,
        to: BookingStatus,
        effects: Vec<SideEffect>,
    ) -> Result<Booking> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        // 1. Status change, only if nobody moved the booking since it was read
        let row = sqlx::query("UPDATE bookings SET status = ? WHERE id = ? AND status = ? RETURNING *")
            .bind(to.as_str())
            .bind(booking_id)
            .bind(from.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(write_error(SLOT_TAKEN))?
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "booking {booking_id} is no longer '{from}'; reload and try again"
                ))
            })?;
        let updated = rows::booking(&row).map_err(internal)?;

        // 2. Side effects
        for effect in effects {
            match effect {
                SideEffect::Notify(notification) => insert_notification(&mut tx, notification).await?,
                SideEffect::Schedule(event) => {
                    insert_event(&mut tx, event).await?;
                }
            }
        }

        tx.commit().await.map_err(internal)?;
        Ok(updated)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testing;
    use chrono::{TimeZone, Utc};
    use domains::{
        CalendarRepo, EventType, NewCalendarEvent, NewService, NotificationRepo, Role, ServiceRepo,
        User,
    };

    pub(crate) fn request(user: &User, provider: &User, service_id: i64, time: &str) -> NewBooking {
        NewBooking {
            user_id: user.id,
            provider_id: provider.id,
            service_id,
            problem_description: Some("Leaking tap".into()),
            booking_date: "2099-01-01".into(),
            booking_time: time.into(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        }
    }

    pub(crate) fn ping(user_id: i64) -> NewNotification {
        NewNotification {
            user_id,
            title: "New Booking Request".into(),
            message: "ping".into(),
            created_at: Utc::now(),
        }
    }

    /// Inserts `count` bookings at distinct times and walks them to `completed`.
    pub(crate) async fn completed_bookings(
        store: &SqliteStore,
        user: &User,
        provider: &User,
        count: usize,
    ) -> Vec<i64> {
        let mut ids = Vec::with_capacity(count);
        for hour in 0..count {
            let booking = store
                .create_booking(request(user, provider, 1, &format!("{:02}:00", 9 + hour)), ping(provider.id))
                .await
                .unwrap();
            let mut status = booking.status;
            for next in [BookingStatus::Accepted, BookingStatus::Ongoing, BookingStatus::Completed] {
                store.apply_transition(booking.id, status, next, Vec::new()).await.unwrap();
                status = next;
            }
            ids.push(booking.id);
        }
        ids
    }

    #[tokio::test]
    async fn test_active_slot_is_unique_until_released() {
        let store = testing::store().await;
        let alice = testing::user(&store, "alice@example.com", Role::User).await;
        let dave = testing::user(&store, "dave@example.com", Role::User).await;
        let bob = testing::user(&store, "bob@example.com", Role::Provider).await;

        let first = store
            .create_booking(request(&alice, &bob, 1, "10:00"), ping(bob.id))
            .await
            .unwrap();
        let err = store
            .create_booking(request(&dave, &bob, 1, "10:00"), ping(bob.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        // the failed insert must not leave its notification behind
        assert_eq!(store.unread_count(bob.id).await.unwrap(), 1);

        store
            .apply_transition(first.id, BookingStatus::Pending, BookingStatus::Rejected, Vec::new())
            .await
            .unwrap();
        assert!(store
            .create_booking(request(&dave, &bob, 1, "10:00"), ping(bob.id))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_stale_status_loses_the_compare_and_set() {
        let store = testing::store().await;
        let alice = testing::user(&store, "alice@example.com", Role::User).await;
        let bob = testing::user(&store, "bob@example.com", Role::Provider).await;
        let booking = store
            .create_booking(request(&alice, &bob, 1, "10:00"), ping(bob.id))
            .await
            .unwrap();

        store
            .apply_transition(booking.id, BookingStatus::Pending, BookingStatus::Accepted, Vec::new())
            .await
            .unwrap();

        let effects = vec![SideEffect::Notify(ping(alice.id))];
        let err = store
            .apply_transition(booking.id, BookingStatus::Pending, BookingStatus::Rejected, effects)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.unread_count(alice.id).await.unwrap(), 0);
        assert_eq!(
            store.get_booking(booking.id).await.unwrap().unwrap().status,
            BookingStatus::Accepted
        );
    }

    #[tokio::test]
    async fn test_side_effects_commit_with_the_status() {
        let store = testing::store().await;
        let alice = testing::user(&store, "alice@example.com", Role::User).await;
        let bob = testing::user(&store, "bob@example.com", Role::Provider).await;
        let booking = store
            .create_booking(request(&alice, &bob, 1, "10:00"), ping(bob.id))
            .await
            .unwrap();

        let effects = vec![
            SideEffect::Notify(ping(alice.id)),
            SideEffect::Schedule(NewCalendarEvent {
                provider_id: bob.id,
                title: "Booking: Service".into(),
                event_type: EventType::Booking,
                start_datetime: "2099-01-01T10:00".into(),
                end_datetime: None,
                color: Some("#6366f1".into()),
                created_at: Utc::now(),
            }),
        ];
        store
            .apply_transition(booking.id, BookingStatus::Pending, BookingStatus::Accepted, effects)
            .await
            .unwrap();

        assert_eq!(store.unread_count(alice.id).await.unwrap(), 1);
        let events = store.list_events(bob.id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::Booking);
    }

    #[tokio::test]
    async fn test_details_survive_a_deleted_service() {
        let store = testing::store().await;
        let alice = testing::user(&store, "alice@example.com", Role::User).await;
        let bob = testing::user(&store, "bob@example.com", Role::Provider).await;
        let service = store
            .create_service(
                bob.id,
                NewService {
                    service_name: "Pipe repair".into(),
                    description: None,
                    min_price: 40.0,
                    category: "Plumbing".into(),
                    image_url: None,
                },
                Utc::now(),
            )
            .await
            .unwrap();
        store
            .create_booking(request(&alice, &bob, service.id, "10:00"), ping(bob.id))
            .await
            .unwrap();

        let mine = store.list_for_user(alice.id).await.unwrap();
        assert_eq!(mine[0].service_name.as_deref(), Some("Pipe repair"));
        assert_eq!(mine[0].counterpart_name.as_deref(), Some("bob"));

        store.delete_service(service.id).await.unwrap();
        let theirs = store.list_for_provider(bob.id).await.unwrap();
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].service_name, None);
        assert_eq!(theirs[0].counterpart_name.as_deref(), Some("alice"));
        assert_eq!(theirs[0].review_rating, None);
    }
}
