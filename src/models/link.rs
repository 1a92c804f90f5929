//! Relationship links and attribute modification payloads.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, VisureError};
use crate::models::{Attribute, BaseTypeRef, Element, ProjectShared};
use crate::rest;

/// An element given by id or by reference.
#[derive(Debug, Clone, Copy)]
pub enum ElementRef<'a> {
    Id(i64),
    Element(&'a Element),
}

impl ElementRef<'_> {
    /// The element id.
    ///
    /// # Errors
    ///
    /// Returns [`VisureError::MissingField`] for an element without an id.
    pub fn resolve(&self) -> Result<i64> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Element(element) => element.require_id(),
        }
    }
}

impl From<i64> for ElementRef<'_> {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a Element> for ElementRef<'a> {
    fn from(element: &'a Element) -> Self {
        Self::Element(element)
    }
}

/// An attribute given by id or by reference.
#[derive(Debug, Clone, Copy)]
pub enum AttributeRef<'a> {
    Id(i64),
    Attribute(&'a Attribute),
}

impl AttributeRef<'_> {
    pub fn resolve(&self) -> Result<i64> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Attribute(attribute) => attribute.require_id(),
        }
    }
}

impl From<i64> for AttributeRef<'_> {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a Attribute> for AttributeRef<'a> {
    fn from(attribute: &'a Attribute) -> Self {
        Self::Attribute(attribute)
    }
}

/// A relationship type the server offers between two elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipType {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten, default)]
    pub extra: BTreeMap<String, Value>,
}

/// Options for a new relationship.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkOptions {
    /// The first available type is used when unset.
    pub relationship_type: Option<RelationshipType>,
    pub is_suspect: bool,
    pub reason: Option<String>,
    /// Target project for cross-project links; the source project otherwise.
    pub target_project_id: Option<i64>,
}

impl RelationshipType {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            extra: BTreeMap::new(),
        }
    }
}

impl LinkOptions {
    #[must_use]
    pub fn with_type(mut self, relationship_type: RelationshipType) -> Self {
        self.relationship_type = Some(relationship_type);
        self
    }

    #[must_use]
    pub fn suspect(mut self, is_suspect: bool) -> Self {
        self.is_suspect = is_suspect;
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_target_project(mut self, project_id: i64) -> Self {
        self.target_project_id = Some(project_id);
        self
    }
}

/// One relationship to create with [`Project::create_links`](crate::Project::create_links).
#[derive(Debug, Clone)]
pub struct LinkRequest<'a> {
    pub source: ElementRef<'a>,
    pub target: ElementRef<'a>,
    pub options: LinkOptions,
}

impl<'a> LinkRequest<'a> {
    pub fn new(
        source: impl Into<ElementRef<'a>>,
        target: impl Into<ElementRef<'a>>,
        options: LinkOptions,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            options,
        }
    }
}

/// Wire form of one relationship in a `POST relationships` batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipPayload {
    pub id: i64,
    #[serde(rename = "sourceID")]
    pub source_id: i64,
    #[serde(rename = "targetID")]
    pub target_id: i64,
    #[serde(rename = "isSuspect")]
    pub is_suspect: bool,
    #[serde(rename = "projectID")]
    pub project_id: i64,
    #[serde(rename = "targetProjectID")]
    pub target_project_id: i64,
    #[serde(rename = "motiveName")]
    pub motive_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Wire form of an attribute value change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeModification {
    /// Element the attribute belongs to.
    pub parent_id: i64,
    pub id: i64,
    pub base_type: BaseTypeRef,
    pub is_multivalued: bool,
    pub values: Vec<Value>,
}

/// Resolve and submit a batch of links as one `POST relationships` call.
///
/// Every id and relationship type is resolved before anything is sent, so
/// a failure leaves the server untouched.
pub(crate) async fn submit_links(
    project: &Arc<ProjectShared>,
    requests: Vec<LinkRequest<'_>>,
) -> Result<Value> {
    if requests.is_empty() {
        return Ok(Value::Null);
    }

    let resolved = requests
        .iter()
        .map(|r| Ok((r.source.resolve()?, r.target.resolve()?, &r.options)))
        .collect::<Result<Vec<_>>>()?;

    project.activate(None).await?;
    let client = project.session().client();

    let mut payloads = Vec::with_capacity(resolved.len());
    for (source_id, target_id, options) in resolved {
        let relationship_type = match &options.relationship_type {
            Some(t) => t.clone(),
            None => {
                let available =
                    rest::element::get_available_relationships(client, source_id, target_id)
                        .await?;
                available
                    .into_iter()
                    .next()
                    .ok_or(VisureError::NoRelationshipTypes {
                        source_id,
                        target_id,
                    })?
            }
        };

        payloads.push(RelationshipPayload {
            id: relationship_type.id,
            source_id,
            target_id,
            is_suspect: options.is_suspect,
            project_id: project.id(),
            target_project_id: options.target_project_id.unwrap_or(project.id()),
            motive_name: relationship_type.name.unwrap_or_default(),
            reason: options.reason.clone().filter(|r| !r.is_empty()),
        });
    }

    tracing::debug!(project_id = project.id(), count = payloads.len(), "creating links");
    rest::element::create_relationships(client, &payloads).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BaseType;
    use serde_json::json;

    #[test]
    fn test_relationship_payload_wire_shape() {
        let payload = RelationshipPayload {
            id: 4,
            source_id: 10,
            target_id: 20,
            is_suspect: false,
            project_id: 1,
            target_project_id: 1,
            motive_name: "Verifies".to_string(),
            reason: None,
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "id": 4,
                "sourceID": 10,
                "targetID": 20,
                "isSuspect": false,
                "projectID": 1,
                "targetProjectID": 1,
                "motiveName": "Verifies"
            })
        );

        let with_reason = RelationshipPayload {
            reason: Some("covers".to_string()),
            ..payload
        };
        assert_eq!(
            serde_json::to_value(&with_reason).unwrap()["reason"],
            json!("covers")
        );
    }

    #[test]
    fn test_attribute_modification_wire_shape() {
        let modification = AttributeModification {
            parent_id: 5,
            id: 40,
            base_type: BaseType::Enumerated.into(),
            is_multivalued: false,
            values: vec![json!({"id": 1, "name": "Heading"})],
        };

        assert_eq!(
            serde_json::to_value(&modification).unwrap(),
            json!({
                "parentId": 5,
                "id": 40,
                "baseType": "ENUMERATED",
                "isMultivalued": false,
                "values": [{"id": 1, "name": "Heading"}]
            })
        );
    }

    #[test]
    fn test_raw_base_type_is_sent_unchanged() {
        let modification = AttributeModification {
            parent_id: 5,
            id: 40,
            base_type: "RICH_TEXT".into(),
            is_multivalued: true,
            values: vec![],
        };
        assert_eq!(
            serde_json::to_value(&modification).unwrap()["baseType"],
            json!("RICH_TEXT")
        );
    }

    #[test]
    fn test_link_options_builders() {
        let options = LinkOptions::default()
            .with_type(RelationshipType::new(3, "Refines"))
            .suspect(true)
            .with_reason("derived")
            .with_target_project(9);
        assert_eq!(options.relationship_type.map(|t| t.id), Some(3));
        assert!(options.is_suspect);
        assert_eq!(options.reason.as_deref(), Some("derived"));
        assert_eq!(options.target_project_id, Some(9));
    }

    #[test]
    fn test_element_ref_by_id() {
        assert_eq!(ElementRef::from(12).resolve().unwrap(), 12);
        assert_eq!(AttributeRef::Id(7).resolve().unwrap(), 7);
    }
}
