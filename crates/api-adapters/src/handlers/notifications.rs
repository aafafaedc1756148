use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use domains::Notification;

use super::{ApiResult, Message};
use crate::extract::{CurrentUser, QueryParams};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    QueryParams(query): QueryParams<FeedQuery>,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(state.notifications.list(&identity, query.limit).await?))
}

pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(notification_id): Path<i64>,
) -> ApiResult<Json<Message>> {
    state.notifications.mark_read(&identity, notification_id).await?;
    Ok(Message::new("Marked as read"))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<Message>> {
    state.notifications.mark_all_read(&identity).await?;
    Ok(Message::new("All notifications marked as read"))
}

pub async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<UnreadCount>> {
    let count = state.notifications.unread_count(&identity).await?;
    Ok(Json(UnreadCount { count }))
}
