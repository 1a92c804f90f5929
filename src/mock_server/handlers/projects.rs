//! Project endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use super::{check_token, error_response, no_active_project};
use crate::mock_server::state::MockState;

/// Body of `POST project/current`.
#[derive(Debug, Deserialize)]
pub struct ActivateParams {
    pub project: i64,
    pub group: i64,
}

/// GET /projects
pub async fn list_projects(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let state = state.read().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    (StatusCode::OK, Json(state.list_projects())).into_response()
}

/// GET /project/{id}
pub async fn get_project(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let state = state.read().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    match state.projects.get(&id) {
        Some(project) => {
            let mut details = project.clone();
            details["description"] = json!(format!("Details of project {id}"));
            (StatusCode::OK, Json(details)).into_response()
        }
        None => error_response(
            StatusCode::NOT_FOUND,
            "Project not found",
            format!("No project found with id: {id}"),
        ),
    }
}

/// POST /project/current
pub async fn set_active_project(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Json(params): Json<ActivateParams>,
) -> impl IntoResponse {
    let mut state = state.write().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    if !state.activate(params.project) {
        return error_response(
            StatusCode::NOT_FOUND,
            "Project not found",
            format!("No project found with id: {}", params.project),
        );
    }

    (
        StatusCode::OK,
        Json(json!({"project": params.project, "group": params.group})),
    )
        .into_response()
}

/// GET /project/attribute/types
pub async fn get_attribute_types(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let state = state.read().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    match state.active_attribute_types() {
        Some(types) => (StatusCode::OK, Json(types)).into_response(),
        None => no_active_project(),
    }
}
