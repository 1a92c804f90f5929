//! Authentication endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::VisureClient;
use crate::error::{Result, VisureError};
use crate::models::LicenseType;

/// Response of the login and token refresh endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Absent when the server refused the credentials.
    #[serde(default)]
    pub access_token: Option<AccessToken>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Projects visible to the user, as raw objects.
    #[serde(default)]
    pub projects: Vec<Value>,
}

/// Access/refresh token pair.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken").finish_non_exhaustive()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    license_type: LicenseType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// POST authenticate
#[tracing::instrument(skip(client, password))]
pub async fn authenticate(
    client: &VisureClient,
    username: &str,
    password: &str,
    license_type: LicenseType,
) -> Result<AuthResponse> {
    let body = LoginRequest {
        username,
        password,
        license_type,
    };
    let response = client.post("authenticate", &body).await?;
    response.json().await.map_err(VisureError::HttpError)
}

/// POST token/refresh
#[tracing::instrument(skip_all)]
pub async fn token_refresh(client: &VisureClient, refresh_token: &str) -> Result<AuthResponse> {
    let response = client
        .post("token/refresh", &RefreshRequest { refresh_token })
        .await?;
    response.json().await.map_err(VisureError::HttpError)
}

/// POST logout
#[tracing::instrument(skip(client))]
pub async fn logout(client: &VisureClient) -> Result<Value> {
    let response = client.post_empty("logout").await?;
    VisureClient::json_or_null(response).await
}
