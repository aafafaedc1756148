use axum::extract::{Path, State};
use axum::Json;

use domains::{CalendarEvent, CalendarEventPatch};
use services::NewEventRequest;

use super::{ApiResult, Message};
use crate::extract::{CurrentUser, JsonBody};
use crate::state::AppState;

pub async fn list_events(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<Vec<CalendarEvent>>> {
    Ok(Json(state.calendar.list(&identity).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    JsonBody(request): JsonBody<NewEventRequest>,
) -> ApiResult<Json<CalendarEvent>> {
    Ok(Json(state.calendar.create(&identity, request).await?))
}

pub async fn update_event(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(event_id): Path<i64>,
    JsonBody(patch): JsonBody<CalendarEventPatch>,
) -> ApiResult<Json<CalendarEvent>> {
    Ok(Json(state.calendar.update(&identity, event_id, patch).await?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(event_id): Path<i64>,
) -> ApiResult<Json<Message>> {
    state.calendar.delete(&identity, event_id).await?;
    Ok(Message::new("Event deleted"))
}
