//! HTTP request handlers for the mock server.

pub mod auth;
pub mod elements;
pub mod projects;
pub mod specifications;

pub use auth::*;
pub use elements::*;
pub use projects::*;
pub use specifications::*;

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::mock_server::state::MockState;

/// Build the JSON error body the authoring API returns.
pub(crate) fn error_response(status: StatusCode, error: &str, message: String) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "message": message
        })),
    )
        .into_response()
}

/// Reject requests that do not carry the session's bearer token.
pub(crate) fn check_token(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if state.is_valid_token(token) => Ok(()),
        _ => Err(error_response(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Missing or invalid access token".to_string(),
        )),
    }
}

/// Reject project-scoped requests made before any project was activated.
pub(crate) fn no_active_project() -> Response {
    error_response(
        StatusCode::CONFLICT,
        "No active project",
        "Select a project with POST project/current first".to_string(),
    )
}
