//! Specification endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{check_token, error_response, no_active_project};
use crate::mock_server::state::MockState;

/// Query parameters of `GET specification/{id}/items`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsQuery {
    #[allow(dead_code)] // The mock has no filters to ignore
    pub ignore_active_filters: Option<bool>,
    pub search: Option<String>,
}

/// Body of `POST specification/{id}/elements`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateElementsParams {
    pub parent_id: i64,
    #[allow(dead_code)] // Placement is not modelled by the mock
    pub as_children: bool,
    pub count: u32,
}

fn specification_not_found(id: i64) -> axum::response::Response {
    error_response(
        StatusCode::NOT_FOUND,
        "Specification not found",
        format!("No specification found with id: {id}"),
    )
}

/// GET /specification/hierarchy/tolist
pub async fn list_specifications(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let state = state.read().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    match state.active_specifications() {
        Some(specifications) => (StatusCode::OK, Json(specifications)).into_response(),
        None => no_active_project(),
    }
}

/// GET /specification/{id}/items
pub async fn list_items(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<ItemsQuery>,
) -> impl IntoResponse {
    let state = state.read().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    match state.specification_items(id, query.search.as_deref()) {
        Some(items) => (StatusCode::OK, Json(items)).into_response(),
        None => specification_not_found(id),
    }
}

/// GET /specification/{id}/attributes
pub async fn list_specification_attributes(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let state = state.read().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    if state.get_specification(id).is_none() {
        return specification_not_found(id);
    }

    let attributes = state
        .specification_attributes
        .get(&id)
        .cloned()
        .unwrap_or_default();
    (StatusCode::OK, Json(attributes)).into_response()
}

/// POST /specification/{id}/elements
pub async fn create_elements(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(params): Json<CreateElementsParams>,
) -> impl IntoResponse {
    let mut state = state.write().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    match state.create_elements(id, params.parent_id, params.count) {
        Some(created) => (StatusCode::CREATED, Json(created)).into_response(),
        None => specification_not_found(id),
    }
}
