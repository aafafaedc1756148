//! # services
//!
//! Business rules of the marketplace, written against the `domains` ports only.
//! The booking lifecycle is the heart of it; the remaining services are thin
//! ownership and validation layers over their repositories.

pub mod accounts;
pub mod availability;
pub mod bookings;
pub mod calendar;
pub mod catalog;
pub mod notifications;
pub mod reviews;

pub use accounts::{AccountService, AuthToken, LoginRequest, RegisterRequest};
pub use availability::AvailabilityService;
pub use bookings::{BookingRequest, BookingService};
pub use calendar::{CalendarService, NewEventRequest};
pub use catalog::CatalogService;
pub use notifications::NotificationService;
pub use reviews::{ReviewEdit, ReviewRequest, ReviewService};

use domains::{AppError, Identity, Result, Role};

/// Fails with `Forbidden` unless the caller holds `role`.
pub(crate) fn require_role(identity: &Identity, role: Role, message: &str) -> Result<()> {
    if identity.role == role {
        Ok(())
    } else {
        Err(AppError::Forbidden(message.to_string()))
    }
}
