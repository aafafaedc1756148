//! # Domain Models
//!
//! These structs represent the core entities of SkillBridge.
//! Relationships are plain `i64` foreign keys; nothing here holds a pointer
//! back to its owner.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Account role. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Provider,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Provider => "provider",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "provider" => Ok(Self::Provider),
            other => Err(AppError::ValidationError(format!("unknown role '{other}'"))),
        }
    }
}

/// The verified caller of an operation, as produced by the `AuthProvider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
}

/// Booking workflow status. The string forms are a wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
    Ongoing,
    Completed,
    Disputed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 6] = [
        Self::Pending,
        Self::Accepted,
        Self::Rejected,
        Self::Ongoing,
        Self::Completed,
        Self::Disputed,
    ];

    /// Statuses that occupy a provider's slot.
    pub const ACTIVE: [BookingStatus; 3] = [Self::Pending, Self::Accepted, Self::Ongoing];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Disputed => "disputed",
        }
    }

    /// The transition graph. `Rejected` and `Disputed` are terminal.
    pub const fn allowed_next(self) -> &'static [BookingStatus] {
        match self {
            Self::Pending => &[Self::Accepted, Self::Rejected],
            Self::Accepted => &[Self::Ongoing, Self::Rejected],
            Self::Ongoing => &[Self::Completed],
            Self::Completed => &[Self::Disputed],
            Self::Rejected | Self::Disputed => &[],
        }
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::ValidationError(format!("unknown booking status '{s}'")))
    }
}

/// Kind of a provider calendar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Holiday,
    #[default]
    Event,
    Reminder,
    Booking,
}

impl EventType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Holiday => "holiday",
            Self::Event => "event",
            Self::Reminder => "reminder",
            Self::Booking => "booking",
        }
    }
}

impl FromStr for EventType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "holiday" => Ok(Self::Holiday),
            "event" => Ok(Self::Event),
            "reminder" => Ok(Self::Reminder),
            "booking" => Ok(Self::Booking),
            other => Err(AppError::ValidationError(format!("unknown event type '{other}'"))),
        }
    }
}

// ── Users ───────────────────────────────────────────────────────────────────

/// A registered account. The password hash never leaves the store through this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub mobile: Option<String>,
    pub age: Option<i32>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub mobile: Option<String>,
    pub age: Option<i32>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile fields a user may change about themselves.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub mobile: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserPatch {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(age) = self.age {
            user.age = Some(age);
        }
        if let Some(location) = self.location {
            user.location = Some(location);
        }
        if let Some(bio) = self.bio {
            user.bio = Some(bio);
        }
        if let Some(mobile) = self.mobile {
            user.mobile = Some(mobile);
        }
        if let Some(avatar_url) = self.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
    }
}

// ── Services ────────────────────────────────────────────────────────────────

/// A service offered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub provider_id: i64,
    pub service_name: String,
    pub description: Option<String>,
    pub min_price: f64,
    pub category: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewService {
    pub service_name: String,
    pub description: Option<String>,
    pub min_price: f64,
    pub category: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServicePatch {
    pub service_name: Option<String>,
    pub description: Option<String>,
    pub min_price: Option<f64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl ServicePatch {
    pub fn apply(self, service: &mut Service) {
        if let Some(service_name) = self.service_name {
            service.service_name = service_name;
        }
        if let Some(description) = self.description {
            service.description = Some(description);
        }
        if let Some(min_price) = self.min_price {
            service.min_price = min_price;
        }
        if let Some(category) = self.category {
            service.category = category;
        }
        if let Some(image_url) = self.image_url {
            service.image_url = Some(image_url);
        }
    }
}

/// Optional search filters for the public service listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub location: Option<String>,
}

// ── Bookings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub provider_id: i64,
    pub service_id: i64,
    pub problem_description: Option<String>,
    /// `YYYY-MM-DD`
    pub booking_date: String,
    /// `HH:MM`, free-form
    pub booking_time: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub user_id: i64,
    pub provider_id: i64,
    pub service_id: i64,
    pub problem_description: Option<String>,
    pub booking_date: String,
    pub booking_time: String,
    pub created_at: DateTime<Utc>,
}

/// A booking joined with the names a dashboard needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    /// `None` when the service has since been deleted
    pub service_name: Option<String>,
    /// Provider name on a user's list, user name on a provider's list
    pub counterpart_name: Option<String>,
    pub review_rating: Option<f64>,
}

/// A write the lifecycle engine requires alongside a status change.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    Notify(NewNotification),
    Schedule(NewCalendarEvent),
}

// ── Reviews ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub booking_id: i64,
    pub user_id: i64,
    pub provider_id: i64,
    pub rating: f64,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub booking_id: i64,
    pub user_id: i64,
    pub provider_id: i64,
    pub rating: f64,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw aggregate as returned by the store; `average` is `None` without reviews.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingAggregate {
    pub average: Option<f64>,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub provider_id: i64,
    pub avg_rating: f64,
    pub total_reviews: i64,
}

// ── Calendar ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub provider_id: i64,
    pub title: String,
    pub event_type: EventType,
    pub start_datetime: String,
    pub end_datetime: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCalendarEvent {
    pub provider_id: i64,
    pub title: String,
    pub event_type: EventType,
    pub start_datetime: String,
    pub end_datetime: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CalendarEventPatch {
    pub title: Option<String>,
    pub event_type: Option<EventType>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    pub color: Option<String>,
}

impl CalendarEventPatch {
    pub fn apply(self, event: &mut CalendarEvent) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(event_type) = self.event_type {
            event.event_type = event_type;
        }
        if let Some(start_datetime) = self.start_datetime {
            event.start_datetime = start_datetime;
        }
        if let Some(end_datetime) = self.end_datetime {
            event.end_datetime = Some(end_datetime);
        }
        if let Some(color) = self.color {
            event.color = Some(color);
        }
    }
}

// ── Availability ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub id: i64,
    pub provider_id: i64,
    /// 0 = Monday, 6 = Sunday
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AvailabilitySlot {
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

// ── Notifications ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// ── Platform ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlatformStats {
    pub total_services: i64,
    pub total_providers: i64,
    pub avg_rating: f64,
}

/// Round to one decimal place, the precision ratings are shown with.
pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
