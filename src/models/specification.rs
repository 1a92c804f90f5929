//! Specification model.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, VisureError};
use crate::hydrate::{HydrationContext, RawFields};
use crate::models::{Attribute, Element, ElementRef, Owner, ProjectShared};
use crate::rest;
use crate::traits::FromData;

/// Options for [`Specification::fetch_elements`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementQuery {
    /// Return every element, regardless of filters active in the project.
    pub ignore_active_filters: bool,
    /// Server-side search string.
    pub search: Option<String>,
    /// Also fetch each element's attributes.
    pub deep: bool,
}

impl Default for ElementQuery {
    fn default() -> Self {
        Self {
            ignore_active_filters: true,
            search: None,
            deep: false,
        }
    }
}

impl ElementQuery {
    #[must_use]
    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn with_active_filters(mut self) -> Self {
        self.ignore_active_filters = false;
        self
    }
}

/// A specification (document) inside a project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    #[serde(skip)]
    project: Arc<ProjectShared>,
    id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elements: Option<Vec<Element>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<Vec<Attribute>>,
}

impl FromData for Specification {
    fn from_data(raw: &Value, ctx: &HydrationContext<'_>) -> Result<Self> {
        let project = ctx.project().cloned().ok_or(VisureError::ProjectUnavailable)?;
        let mut fields = RawFields::from_value("specification", raw)?;
        let id = fields.take("id").ok_or(VisureError::MissingField {
            entity: "specification",
            field: "id",
        })?;

        Ok(Self {
            project,
            id,
            name: fields.take("name"),
            author: fields.take("author"),
            prefix: fields.take("prefix"),
            doc_type: fields.take("docType"),
            element_type: fields.take("elementType"),
            check_in_status: fields.take("checkInStatus"),
            parent_id: fields.take("parentId"),
            extra: fields.into_extra(),
            elements: None,
            attributes: None,
        })
    }
}

impl Specification {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn project_id(&self) -> i64 {
        self.project.id()
    }

    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    /// Elements from the last fetch plus any created since.
    pub fn elements(&self) -> Option<&[Element]> {
        self.elements.as_deref()
    }

    pub fn elements_mut(&mut self) -> &mut [Element] {
        self.elements.as_deref_mut().unwrap_or_default()
    }

    pub fn element(&self, id: i64) -> Option<&Element> {
        self.elements()?.iter().find(|e| e.id() == Some(id))
    }

    pub fn element_mut(&mut self, id: i64) -> Option<&mut Element> {
        self.elements
            .as_mut()?
            .iter_mut()
            .find(|e| e.id() == Some(id))
    }

    pub fn attributes(&self) -> Option<&[Attribute]> {
        self.attributes.as_deref()
    }

    /// Fetch the specification's elements, replacing the cached list.
    ///
    /// The server lists the document itself first; that entry is skipped.
    pub async fn fetch_elements(&mut self, query: &ElementQuery) -> Result<&mut [Element]> {
        self.project.activate(None).await?;
        let raw = rest::specification::get_elements(
            self.project.session().client(),
            self.id,
            query.ignore_active_filters,
            query.search.as_deref(),
        )
        .await?;

        let ctx = HydrationContext::for_project(&self.project);
        let mut elements = raw
            .iter()
            .skip(1)
            .map(|r| Element::from_data(r, &ctx))
            .collect::<Result<Vec<_>>>()?;

        if query.deep {
            try_join_all(elements.iter_mut().map(|e| e.fetch_attributes())).await?;
        }

        tracing::debug!(
            specification_id = self.id,
            count = elements.len(),
            deep = query.deep,
            "elements fetched"
        );
        let elements = self.elements.insert(elements);
        Ok(elements.as_mut_slice())
    }

    /// Create `count` elements, appending them to the cached list.
    ///
    /// Without a `parent` the elements are placed at the document root.
    pub async fn create_elements(
        &mut self,
        parent: Option<ElementRef<'_>>,
        as_children: bool,
        count: u32,
    ) -> Result<Vec<Element>> {
        let parent_id = match parent {
            Some(parent) => parent.resolve()?,
            None => self.id,
        };

        self.project.activate(None).await?;
        let raw = rest::specification::create_elements(
            self.project.session().client(),
            self.id,
            parent_id,
            as_children,
            count,
        )
        .await?;

        let ctx = HydrationContext::for_project(&self.project);
        let created = raw
            .iter()
            .map(|r| Element::from_data(r, &ctx))
            .collect::<Result<Vec<_>>>()?;

        self.elements
            .get_or_insert_with(Vec::new)
            .extend(created.iter().cloned());
        Ok(created)
    }

    /// Create a single element.
    pub async fn create_element(
        &mut self,
        parent: Option<ElementRef<'_>>,
        as_children: bool,
    ) -> Result<Element> {
        self.create_elements(parent, as_children, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| VisureError::ApiError {
                message: "element creation returned no elements".to_string(),
                status_code: None,
            })
    }

    /// Fetch the attributes defined on this specification.
    pub async fn fetch_attributes(&mut self) -> Result<&[Attribute]> {
        let raw =
            rest::specification::get_attributes(self.project.session().client(), self.id).await?;

        let ctx = HydrationContext::for_project(&self.project)
            .with_owner(Some(Owner::Specification(self.id)));
        let attributes = raw
            .iter()
            .map(|r| Attribute::from_data(r, &ctx))
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.attributes.insert(attributes);
        Ok(attributes.as_slice())
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Specification {} ({})",
            self.id,
            self.name.as_deref().unwrap_or("None")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParserRegistry, Session, VisureClient};
    use serde_json::json;

    fn project() -> Arc<ProjectShared> {
        let client = VisureClient::new("https://visure.example.com", true).unwrap();
        let session = Session::new(client, ParserRegistry::default());
        Arc::new(ProjectShared::new(1, session, Vec::new()))
    }

    #[test]
    fn test_specification_from_data() {
        let project = project();
        let ctx = HydrationContext::for_project(&project);
        let spec = Specification::from_data(
            &json!({
                "id": 30,
                "name": "System Requirements",
                "prefix": "SYS",
                "docType": "REQUIREMENTS",
                "checkInStatus": "CHECKED_IN",
                "parentId": 2,
                "locked": false
            }),
            &ctx,
        )
        .unwrap();

        assert_eq!(spec.id(), 30);
        assert_eq!(spec.project_id(), 1);
        assert_eq!(spec.prefix.as_deref(), Some("SYS"));
        assert_eq!(spec.doc_type.as_deref(), Some("REQUIREMENTS"));
        assert_eq!(spec.parent_id, Some(2));
        assert_eq!(spec.extra().get("locked"), Some(&json!(false)));
        assert!(spec.elements().is_none());
        assert_eq!(spec.to_string(), "Specification 30 (System Requirements)");
    }

    #[test]
    fn test_mistyped_promoted_fields_serialize_once() {
        let project = project();
        let ctx = HydrationContext::for_project(&project);
        let spec = Specification::from_data(
            &json!({"id": 30, "name": null, "prefix": 7, "parentId": null}),
            &ctx,
        )
        .unwrap();

        assert!(spec.name.is_none());
        assert!(spec.prefix.is_none());
        assert_eq!(spec.extra().get("prefix"), Some(&json!(7)));

        let output = serde_json::to_string(&spec).unwrap();
        for key in ["\"name\"", "\"prefix\"", "\"parentId\""] {
            assert_eq!(output.matches(key).count(), 1, "{key} in {output}");
        }
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({"id": 30, "name": null, "prefix": 7, "parentId": null})
        );
    }

    #[test]
    fn test_specification_requires_project() {
        let client = VisureClient::new("https://visure.example.com", true).unwrap();
        let session = Session::new(client, ParserRegistry::default());
        let ctx = HydrationContext::new(&session);
        assert!(matches!(
            Specification::from_data(&json!({"id": 1}), &ctx).unwrap_err(),
            VisureError::ProjectUnavailable
        ));
    }

    #[test]
    fn test_element_query_defaults() {
        let query = ElementQuery::default();
        assert!(query.ignore_active_filters);
        assert!(!query.deep);
        assert!(query.search.is_none());

        let query = ElementQuery::default().deep(true).with_search("brake");
        assert!(query.deep);
        assert_eq!(query.search.as_deref(), Some("brake"));
    }
}
