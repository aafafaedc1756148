use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use domains::{Booking, BookingDetails, BookingStatus};
use services::BookingRequest;

use super::ApiResult;
use crate::extract::{CurrentUser, JsonBody};
use crate::state::AppState;

/// Body of `PUT /bookings/{id}/status`. Unknown status strings are rejected
/// while parsing.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: BookingStatus,
}

pub async fn create_booking(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    JsonBody(request): JsonBody<BookingRequest>,
) -> ApiResult<Json<Booking>> {
    let booking = state.bookings.create_booking(&identity, request).await?;
    state.metrics.booking_created();
    Ok(Json(booking))
}

pub async fn user_bookings(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<Vec<BookingDetails>>> {
    Ok(Json(state.bookings.bookings_for_user(&identity).await?))
}

pub async fn provider_bookings(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<Vec<BookingDetails>>> {
    Ok(Json(state.bookings.bookings_for_provider(&identity).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(booking_id): Path<i64>,
    JsonBody(update): JsonBody<StatusUpdate>,
) -> ApiResult<Json<Booking>> {
    let booking = state
        .bookings
        .transition_status(&identity, booking_id, update.status)
        .await?;
    state.metrics.booking_transitioned(booking.status);
    Ok(Json(booking))
}
