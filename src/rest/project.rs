//! Project endpoints.

use serde::Serialize;
use serde_json::Value;

use crate::client::VisureClient;
use crate::error::{Result, VisureError};

/// GET projects
#[tracing::instrument(skip(client))]
pub async fn get_projects(client: &VisureClient) -> Result<Vec<Value>> {
    let response = client.get("projects").await?;
    response.json().await.map_err(VisureError::HttpError)
}

/// GET project/{id}
#[tracing::instrument(skip(client))]
pub async fn get_project_info(client: &VisureClient, project_id: i64) -> Result<Value> {
    let response = client.get(&format!("project/{project_id}")).await?;
    response.json().await.map_err(VisureError::HttpError)
}

/// POST project/current
///
/// Makes `project_id` the server-side active project for this session,
/// acting under the role/group `group`.
#[tracing::instrument(skip(client))]
pub async fn set_active_project(client: &VisureClient, project_id: i64, group: i64) -> Result<Value> {
    #[derive(Serialize)]
    struct ActivateRequest {
        project: i64,
        group: i64,
    }

    let body = ActivateRequest {
        project: project_id,
        group,
    };
    let response = client.post("project/current", &body).await?;
    VisureClient::json_or_null(response).await
}

/// GET project/attribute/types
///
/// Scoped to the active project.
#[tracing::instrument(skip(client))]
pub async fn get_attribute_types(client: &VisureClient) -> Result<Vec<Value>> {
    let response = client.get("project/attribute/types").await?;
    response.json().await.map_err(VisureError::HttpError)
}
