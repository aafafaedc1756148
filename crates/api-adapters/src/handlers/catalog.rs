use axum::extract::{Path, State};
use axum::Json;

use domains::{NewService, Service, ServiceFilter, ServicePatch};

use super::{ApiResult, Message};
use crate::extract::{CurrentUser, JsonBody, QueryParams};
use crate::state::AppState;

pub async fn list_services(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ServiceFilter>,
) -> ApiResult<Json<Vec<Service>>> {
    Ok(Json(state.catalog.list_services(filter).await?))
}

pub async fn categories(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.catalog.categories().await?))
}

pub async fn my_services(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<Vec<Service>>> {
    Ok(Json(state.catalog.my_services(&identity).await?))
}

pub async fn get_service(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
) -> ApiResult<Json<Service>> {
    Ok(Json(state.catalog.get_service(service_id).await?))
}

pub async fn provider_services(
    State(state): State<AppState>,
    Path(provider_id): Path<i64>,
) -> ApiResult<Json<Vec<Service>>> {
    Ok(Json(state.catalog.provider_services(provider_id).await?))
}

pub async fn create_service(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    JsonBody(service): JsonBody<NewService>,
) -> ApiResult<Json<Service>> {
    Ok(Json(state.catalog.create_service(&identity, service).await?))
}

pub async fn update_service(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(service_id): Path<i64>,
    JsonBody(patch): JsonBody<ServicePatch>,
) -> ApiResult<Json<Service>> {
    Ok(Json(state.catalog.update_service(&identity, service_id, patch).await?))
}

pub async fn delete_service(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(service_id): Path<i64>,
) -> ApiResult<Json<Message>> {
    state.catalog.delete_service(&identity, service_id).await?;
    Ok(Message::new("Service deleted"))
}
