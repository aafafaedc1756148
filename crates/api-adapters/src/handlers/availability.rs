use axum::extract::{Path, State};
use axum::Json;

use domains::{Availability, AvailabilitySlot};

use super::{ApiResult, Message};
use crate::extract::{CurrentUser, JsonBody};
use crate::state::AppState;

pub async fn my_availability(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<Vec<Availability>>> {
    Ok(Json(state.availability.my_availability(&identity).await?))
}

pub async fn provider_availability(
    State(state): State<AppState>,
    Path(provider_id): Path<i64>,
) -> ApiResult<Json<Vec<Availability>>> {
    Ok(Json(state.availability.provider_availability(provider_id).await?))
}

pub async fn set_availability(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    JsonBody(slot): JsonBody<AvailabilitySlot>,
) -> ApiResult<Json<Availability>> {
    Ok(Json(state.availability.set_availability(&identity, slot).await?))
}

pub async fn delete_availability(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(availability_id): Path<i64>,
) -> ApiResult<Json<Message>> {
    state
        .availability
        .delete_availability(&identity, availability_id)
        .await?;
    Ok(Message::new("Deleted"))
}
