use axum::extract::{Path, State};
use axum::Json;

use domains::{RatingSummary, Review};
use services::{ReviewEdit, ReviewRequest};

use super::ApiResult;
use crate::extract::{CurrentUser, JsonBody};
use crate::state::AppState;

pub async fn submit_review(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    JsonBody(request): JsonBody<ReviewRequest>,
) -> ApiResult<Json<Review>> {
    Ok(Json(state.reviews.submit_review(&identity, request).await?))
}

pub async fn edit_review(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(booking_id): Path<i64>,
    JsonBody(edit): JsonBody<ReviewEdit>,
) -> ApiResult<Json<Review>> {
    Ok(Json(state.reviews.edit_review(&identity, booking_id, edit).await?))
}

/// Requires a signed-in caller, like the rest of the booking views.
pub async fn review_for_booking(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(booking_id): Path<i64>,
) -> ApiResult<Json<Review>> {
    Ok(Json(state.reviews.review_for_booking(booking_id).await?))
}

pub async fn provider_reviews(
    State(state): State<AppState>,
    Path(provider_id): Path<i64>,
) -> ApiResult<Json<Vec<Review>>> {
    Ok(Json(state.reviews.provider_reviews(provider_id).await?))
}

pub async fn provider_average(
    State(state): State<AppState>,
    Path(provider_id): Path<i64>,
) -> ApiResult<Json<RatingSummary>> {
    Ok(Json(state.reviews.average_rating(provider_id).await?))
}
