use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use domains::{User, UserPatch};
use services::{AuthToken, LoginRequest, RegisterRequest};

use super::ApiResult;
use crate::extract::{CurrentUser, JsonBody, QueryParams};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.accounts.register(request).await?))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<Json<AuthToken>> {
    Ok(Json(state.accounts.login(request).await?))
}

pub async fn me(State(state): State<AppState>, CurrentUser(identity): CurrentUser) -> ApiResult<Json<User>> {
    Ok(Json(state.accounts.me(&identity).await?))
}

pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    JsonBody(patch): JsonBody<UserPatch>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.accounts.update_me(&identity, patch).await?))
}

pub async fn get_user(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResult<Json<User>> {
    Ok(Json(state.accounts.get_user(user_id).await?))
}

pub async fn list_providers(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LocationQuery>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.accounts.list_providers(query.location).await?))
}
