//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be used by the binary.
//! Every write method is a single atomic unit of work: it either commits all
//! the rows it touches or none of them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::error::Result;
use crate::models::{
    Availability, AvailabilitySlot, Booking, BookingDetails, BookingStatus, CalendarEvent,
    Identity, NewBooking, NewCalendarEvent, NewNotification, NewReview, NewService, NewUser,
    Notification, PlatformStats, RatingAggregate, Review, Service, ServiceFilter, SideEffect,
    User,
};

/// Account persistence.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn get_user(&self, id: i64) -> Result<Option<User>>;
    /// Returns the user together with their stored password hash.
    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>>;
    async fn update_user(&self, user: User) -> Result<User>;
    async fn list_providers(&self, location: Option<String>) -> Result<Vec<User>>;
}

/// Service catalog persistence.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait ServiceRepo: Send + Sync {
    async fn create_service(
        &self,
        provider_id: i64,
        service: NewService,
        created_at: DateTime<Utc>,
    ) -> Result<Service>;
    async fn get_service(&self, id: i64) -> Result<Option<Service>>;
    async fn list_services(&self, filter: ServiceFilter) -> Result<Vec<Service>>;
    async fn list_by_provider(&self, provider_id: i64) -> Result<Vec<Service>>;
    async fn categories(&self) -> Result<Vec<String>>;
    async fn update_service(&self, service: Service) -> Result<Service>;
    async fn delete_service(&self, id: i64) -> Result<()>;
}

/// Booking persistence, including the atomic lifecycle writes.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait BookingRepo: Send + Sync {
    /// Any booking in an active status occupying the given slot.
    async fn find_active_booking(
        &self,
        provider_id: i64,
        booking_date: &str,
        booking_time: &str,
    ) -> Result<Option<Booking>>;

    /// Inserts a `pending` booking and the provider's notification together.
    /// Fails with `Conflict` if the slot was taken concurrently.
    async fn create_booking(
        &self,
        booking: NewBooking,
        notification: NewNotification,
    ) -> Result<Booking>;

    async fn get_booking(&self, id: i64) -> Result<Option<Booking>>;
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<BookingDetails>>;
    async fn list_for_provider(&self, provider_id: i64) -> Result<Vec<BookingDetails>>;

    /// Moves a booking from `from` to `to` and applies `effects` in the same
    /// transaction. Fails with `Conflict` if the stored status is no longer `from`.
    async fn apply_transition(
        &self,
        booking_id: i64,
        from: BookingStatus,
        to: BookingStatus,
        effects: Vec<SideEffect>,
    ) -> Result<Booking>;
}

/// Review persistence.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait ReviewRepo: Send + Sync {
    async fn get_review_by_booking(&self, booking_id: i64) -> Result<Option<Review>>;
    async fn find_review(&self, booking_id: i64, user_id: i64) -> Result<Option<Review>>;
    /// Inserts the review and the provider's notification together.
    /// Fails with `Conflict` if the booking already has a review.
    async fn create_review(
        &self,
        review: NewReview,
        notification: NewNotification,
    ) -> Result<Review>;
    /// Overwrites rating and feedback only.
    async fn update_review(
        &self,
        id: i64,
        rating: f64,
        feedback: Option<String>,
    ) -> Result<Review>;
    async fn list_for_provider(&self, provider_id: i64) -> Result<Vec<Review>>;
    async fn rating_aggregate(&self, provider_id: i64) -> Result<RatingAggregate>;
}

/// Provider calendar persistence.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait CalendarRepo: Send + Sync {
    async fn list_events(&self, provider_id: i64) -> Result<Vec<CalendarEvent>>;
    async fn create_event(&self, event: NewCalendarEvent) -> Result<CalendarEvent>;
    async fn get_event(&self, id: i64, provider_id: i64) -> Result<Option<CalendarEvent>>;
    async fn update_event(&self, event: CalendarEvent) -> Result<CalendarEvent>;
    /// Returns `false` if nothing matched.
    async fn delete_event(&self, id: i64, provider_id: i64) -> Result<bool>;
}

/// Weekly availability persistence.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait AvailabilityRepo: Send + Sync {
    async fn list_availability(&self, provider_id: i64) -> Result<Vec<Availability>>;
    /// Inserts or replaces the row for `(provider_id, slot.day_of_week)`.
    async fn upsert_availability(
        &self,
        provider_id: i64,
        slot: AvailabilitySlot,
    ) -> Result<Availability>;
    /// Returns `false` if nothing matched.
    async fn delete_availability(&self, id: i64, provider_id: i64) -> Result<bool>;
}

/// Per-user inbox persistence.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait NotificationRepo: Send + Sync {
    /// Newest first.
    async fn list_notifications(&self, user_id: i64, limit: i64) -> Result<Vec<Notification>>;
    /// Returns `false` if no row belonged to the user.
    async fn mark_read(&self, id: i64, user_id: i64) -> Result<bool>;
    /// Returns the number of rows flipped.
    async fn mark_all_read(&self, user_id: i64) -> Result<u64>;
    async fn unread_count(&self, user_id: i64) -> Result<i64>;
}

/// Cross-entity read queries.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait StatsRepo: Send + Sync {
    async fn platform_stats(&self) -> Result<PlatformStats>;
}

/// Identity and credential contract.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String>;

    /// Verifies a password against a stored hash. Malformed hashes never match.
    async fn verify_password(&self, password: &str, hash: &str) -> bool;

    /// Issues a bearer token for the identity.
    fn issue_token(&self, identity: &Identity) -> Result<String>;

    /// Resolves a bearer token; fails with `Unauthorized` when invalid or expired.
    fn verify_token(&self, token: &str) -> Result<Identity>;
}

/// Source of "now" for date checks and timestamps.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
