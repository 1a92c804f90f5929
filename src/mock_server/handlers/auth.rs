//! Authentication endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use super::{check_token, error_response};
use crate::mock_server::state::MockState;

/// Body of `POST authenticate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginParams {
    pub username: String,
    pub password: String,
    #[allow(dead_code)] // Accepted but every license type is treated alike
    pub license_type: Option<String>,
}

/// Body of `POST token/refresh`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshParams {
    pub refresh_token: String,
}

/// POST /authenticate
pub async fn authenticate(
    State(state): State<Arc<RwLock<MockState>>>,
    Json(params): Json<LoginParams>,
) -> impl IntoResponse {
    let mut state = state.write().await;

    let Some((token, refresh_token)) = state.login(&params.username, &params.password) else {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "Authentication failed",
            format!("Invalid credentials for user: {}", params.username),
        );
    };

    let body = json!({
        "accessToken": {"token": token, "refreshToken": refresh_token},
        "id": 7,
        "username": params.username,
        "email": format!("{}@example.com", params.username),
        "firstName": params.username,
        "lastName": "Tester",
        "projects": state.list_projects()
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /token/refresh
pub async fn refresh_token(
    State(state): State<Arc<RwLock<MockState>>>,
    Json(params): Json<RefreshParams>,
) -> impl IntoResponse {
    let mut state = state.write().await;

    match state.refresh(&params.refresh_token) {
        Some((token, refresh_token)) => (
            StatusCode::OK,
            Json(json!({"accessToken": {"token": token, "refreshToken": refresh_token}})),
        )
            .into_response(),
        None => error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid refresh token",
            "The refresh token is unknown or expired".to_string(),
        ),
    }
}

/// POST /logout
pub async fn logout(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let mut state = state.write().await;

    if let Err(response) = check_token(&state, &headers) {
        return response;
    }

    state.logout();
    StatusCode::NO_CONTENT.into_response()
}
