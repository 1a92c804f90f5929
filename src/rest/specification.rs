//! Specification endpoints.

use serde::Serialize;
use serde_json::Value;

use crate::client::VisureClient;
use crate::error::{Result, VisureError};

/// GET specification/hierarchy/tolist
///
/// Scoped to the active project.
#[tracing::instrument(skip(client))]
pub async fn get_specifications(client: &VisureClient) -> Result<Vec<Value>> {
    let response = client.get("specification/hierarchy/tolist").await?;
    response.json().await.map_err(VisureError::HttpError)
}

/// GET specification/{id}/items
///
/// The first entry of the returned list describes the document itself.
#[tracing::instrument(skip(client))]
pub async fn get_elements(
    client: &VisureClient,
    specification_id: i64,
    ignore_active_filters: bool,
    search: Option<&str>,
) -> Result<Vec<Value>> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct ItemsQuery<'a> {
        ignore_active_filters: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        search: Option<&'a str>,
    }

    let query = ItemsQuery {
        ignore_active_filters,
        search,
    };
    let response = client
        .get_with_query(&format!("specification/{specification_id}/items"), &query)
        .await?;
    response.json().await.map_err(VisureError::HttpError)
}

/// GET specification/{id}/attributes
#[tracing::instrument(skip(client))]
pub async fn get_attributes(client: &VisureClient, specification_id: i64) -> Result<Vec<Value>> {
    let response = client
        .get(&format!("specification/{specification_id}/attributes"))
        .await?;
    response.json().await.map_err(VisureError::HttpError)
}

/// POST specification/{id}/elements
#[tracing::instrument(skip(client))]
pub async fn create_elements(
    client: &VisureClient,
    specification_id: i64,
    parent_id: i64,
    as_children: bool,
    count: u32,
) -> Result<Vec<Value>> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct CreateRequest {
        parent_id: i64,
        as_children: bool,
        count: u32,
    }

    let body = CreateRequest {
        parent_id,
        as_children,
        count,
    };
    let response = client
        .post(&format!("specification/{specification_id}/elements"), &body)
        .await?;
    response.json().await.map_err(VisureError::HttpError)
}
