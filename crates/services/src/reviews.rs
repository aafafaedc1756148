//! # Reviews
//!
//! One review per completed booking, editable for 24 hours.

use std::sync::Arc;

use chrono::Duration;
use serde::Deserialize;
use tracing::info;

use domains::{
    round_rating, AppError, BookingRepo, BookingStatus, Clock, Identity, NewNotification,
    NewReview, RatingSummary, Result, Review, ReviewRepo, Role, UserRepo,
};

use crate::require_role;

/// How long after submission a review may still be edited.
pub const REVIEW_EDIT_WINDOW_HOURS: i64 = 24;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReviewRequest {
    pub booking_id: i64,
    pub rating: f64,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReviewEdit {
    pub rating: f64,
    pub feedback: Option<String>,
}

pub struct ReviewService {
    reviews: Arc<dyn ReviewRepo>,
    bookings: Arc<dyn BookingRepo>,
    users: Arc<dyn UserRepo>,
    clock: Arc<dyn Clock>,
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewRepo>,
        bookings: Arc<dyn BookingRepo>,
        users: Arc<dyn UserRepo>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reviews,
            bookings,
            users,
            clock,
        }
    }

    pub async fn submit_review(&self, identity: &Identity, request: ReviewRequest) -> Result<Review> {
        require_role(identity, Role::User, "Only users can review bookings")?;
        validate_rating(request.rating)?;

        let booking = self
            .bookings
            .get_booking(request.booking_id)
            .await?
            .filter(|booking| booking.user_id == identity.user_id)
            .ok_or_else(|| AppError::not_found("Booking", request.booking_id))?;

        if booking.status != BookingStatus::Completed {
            return Err(AppError::Precondition(
                "Can only review completed bookings".into(),
            ));
        }

        if self.reviews.get_review_by_booking(booking.id).await?.is_some() {
            return Err(AppError::Conflict("You already reviewed this booking".into()));
        }

        let reviewer = self
            .users
            .get_user(identity.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", identity.user_id))?;

        let now = self.clock.now();
        let review = self
            .reviews
            .create_review(
                NewReview {
                    booking_id: booking.id,
                    user_id: identity.user_id,
                    provider_id: booking.provider_id,
                    rating: request.rating,
                    feedback: request.feedback,
                    created_at: now,
                },
                NewNotification {
                    user_id: booking.provider_id,
                    title: "New Review Received".into(),
                    message: format!(
                        "{} gave you a {:.1} star rating.",
                        reviewer.name, request.rating
                    ),
                    created_at: now,
                },
            )
            .await?;

        info!(review_id = review.id, booking_id = booking.id, rating = review.rating, "review submitted");
        Ok(review)
    }

    /// Overwrites rating and feedback; `created_at` is left alone.
    pub async fn edit_review(
        &self,
        identity: &Identity,
        booking_id: i64,
        edit: ReviewEdit,
    ) -> Result<Review> {
        require_role(identity, Role::User, "Only users can edit reviews")?;
        validate_rating(edit.rating)?;

        let review = self
            .reviews
            .find_review(booking_id, identity.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Review", booking_id))?;

        if self.clock.now() - review.created_at > Duration::hours(REVIEW_EDIT_WINDOW_HOURS) {
            return Err(AppError::Precondition(
                "Review edit window has expired (24 hours)".into(),
            ));
        }

        self.reviews.update_review(review.id, edit.rating, edit.feedback).await
    }

    pub async fn review_for_booking(&self, booking_id: i64) -> Result<Review> {
        self.reviews
            .get_review_by_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Review", booking_id))
    }

    /// Newest first.
    pub async fn provider_reviews(&self, provider_id: i64) -> Result<Vec<Review>> {
        self.reviews.list_for_provider(provider_id).await
    }

    pub async fn average_rating(&self, provider_id: i64) -> Result<RatingSummary> {
        let aggregate = self.reviews.rating_aggregate(provider_id).await?;
        Ok(RatingSummary {
            provider_id,
            avg_rating: aggregate.average.map(round_rating).unwrap_or(0.0),
            total_reviews: aggregate.count,
        })
    }
}

fn validate_rating(rating: f64) -> Result<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )))
    }
}
