//! Element endpoints.

use serde::Serialize;
use serde_json::Value;

use crate::client::VisureClient;
use crate::error::{Result, VisureError};
use crate::models::{AttributeModification, RelationshipPayload, RelationshipType};

/// GET specification/element/{id}/attributes
#[tracing::instrument(skip(client))]
pub async fn get_attributes(client: &VisureClient, element_id: i64) -> Result<Vec<Value>> {
    let response = client
        .get(&format!("specification/element/{element_id}/attributes"))
        .await?;
    response.json().await.map_err(VisureError::HttpError)
}

/// GET specification/element/{id}/description
#[tracing::instrument(skip(client))]
pub async fn get_description(client: &VisureClient, element_id: i64) -> Result<Value> {
    let response = client
        .get(&format!("specification/element/{element_id}/description"))
        .await?;
    VisureClient::json_or_null(response).await
}

/// PUT specification/element/{id}/description
#[tracing::instrument(skip(client, text))]
pub async fn set_description(client: &VisureClient, element_id: i64, text: &str) -> Result<Value> {
    #[derive(Serialize)]
    struct Body<'a> {
        description: &'a str,
    }

    let response = client
        .put(
            &format!("specification/element/{element_id}/description"),
            &Body { description: text },
        )
        .await?;
    VisureClient::json_or_null(response).await
}

/// PUT specification/element/{id}/code
#[tracing::instrument(skip(client))]
pub async fn set_code(client: &VisureClient, element_id: i64, code: &str) -> Result<Value> {
    #[derive(Serialize)]
    struct Body<'a> {
        code: &'a str,
    }

    let response = client
        .put(
            &format!("specification/element/{element_id}/code"),
            &Body { code },
        )
        .await?;
    VisureClient::json_or_null(response).await
}

/// PUT specification/element/{id}/name
#[tracing::instrument(skip(client))]
pub async fn set_name(client: &VisureClient, element_id: i64, name: &str) -> Result<Value> {
    #[derive(Serialize)]
    struct Body<'a> {
        name: &'a str,
    }

    let response = client
        .put(
            &format!("specification/element/{element_id}/name"),
            &Body { name },
        )
        .await?;
    VisureClient::json_or_null(response).await
}

/// GET relationship/available
///
/// Relationship types the server allows from `source_id` to `target_id`,
/// in server order.
#[tracing::instrument(skip(client))]
pub async fn get_available_relationships(
    client: &VisureClient,
    source_id: i64,
    target_id: i64,
) -> Result<Vec<RelationshipType>> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Query {
        source_id: i64,
        target_id: i64,
    }

    let response = client
        .get_with_query(
            "relationship/available",
            &Query {
                source_id,
                target_id,
            },
        )
        .await?;
    response.json().await.map_err(VisureError::HttpError)
}

/// POST relationships
#[tracing::instrument(skip(client, relationships), fields(count = relationships.len()))]
pub async fn create_relationships(
    client: &VisureClient,
    relationships: &[RelationshipPayload],
) -> Result<Value> {
    let response = client.post("relationships", relationships).await?;
    VisureClient::json_or_null(response).await
}

/// PUT specification/element/{id}/attribute
#[tracing::instrument(skip(client, modification), fields(attribute_id = modification.id))]
pub async fn modify_attribute(
    client: &VisureClient,
    modification: &AttributeModification,
) -> Result<Value> {
    let response = client
        .put(
            &format!("specification/element/{}/attribute", modification.parent_id),
            modification,
        )
        .await?;
    VisureClient::json_or_null(response).await
}
