//! Element and relationship endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::{check_token, error_response, no_active_project};
use crate::mock_server::state::MockState;

/// Query parameters of `GET relationship/available`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableQuery {
    pub source_id: i64,
    pub target_id: i64,
}

fn element_not_found(id: i64) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "Element not found",
        format!("No element found with id: {id}"),
    )
}

/// GET /specification/element/{id}/attributes
pub async fn list_element_attributes(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let state = state.read().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    if state.get_element(id).is_none() {
        return element_not_found(id);
    }

    let attributes = state.element_attributes.get(&id).cloned().unwrap_or_default();
    (StatusCode::OK, Json(attributes)).into_response()
}

/// GET /specification/element/{id}/description
pub async fn get_description(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let state = state.read().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    match state.get_element(id) {
        Some(element) => {
            let description = element.get("description").cloned().unwrap_or(Value::Null);
            (StatusCode::OK, Json(json!({"description": description}))).into_response()
        }
        None => element_not_found(id),
    }
}

/// Shared body of the single-field element updates.
async fn update_field(
    state: Arc<RwLock<MockState>>,
    headers: HeaderMap,
    id: i64,
    field: &str,
    body: Value,
) -> Response {
    let mut state = state.write().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    let Some(value) = body.get(field).and_then(Value::as_str) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid body",
            format!("Expected a string '{field}'"),
        );
    };

    if state.set_element_field(id, field, value) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        element_not_found(id)
    }
}

/// PUT /specification/element/{id}/description
pub async fn set_description(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    update_field(state, headers, id, "description", body).await
}

/// PUT /specification/element/{id}/code
pub async fn set_code(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    update_field(state, headers, id, "code", body).await
}

/// PUT /specification/element/{id}/name
pub async fn set_name(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    update_field(state, headers, id, "name", body).await
}

/// PUT /specification/element/{id}/attribute
pub async fn modify_attribute(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut state = state.write().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    if state.modify_attribute(id, body.clone()) {
        (StatusCode::OK, Json(body)).into_response()
    } else {
        element_not_found(id)
    }
}

/// GET /relationship/available
pub async fn available_relationships(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Query(query): Query<AvailableQuery>,
) -> impl IntoResponse {
    let state = state.read().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    for id in [query.source_id, query.target_id] {
        if state.get_element(id).is_none() {
            return element_not_found(id);
        }
    }

    (StatusCode::OK, Json(state.relationship_types.clone())).into_response()
}

/// POST /relationships
pub async fn create_relationships(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Json(relationships): Json<Vec<Value>>,
) -> impl IntoResponse {
    let mut state = state.write().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    if state.active_project.is_none() {
        return no_active_project();
    }

    let created = relationships.len();
    state.relationships.extend(relationships);
    (StatusCode::CREATED, Json(json!({"created": created}))).into_response()
}
