//! Element model.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, VisureError};
use crate::hydrate::{parse_field, Field, HydrationContext, HydrationTarget};
use crate::models::link::submit_links;
use crate::models::{
    Attribute, AttributeModification, AttributeRef, BaseType, BaseTypeRef, ElementRef,
    LinkOptions, LinkRequest, Owner, ProjectShared, RelationshipType,
};
use crate::rest;
use crate::traits::FromData;

/// Bookmark prefix used in in-line link anchors.
pub const BOOKMARK_PREFIX: &str = "VISURE";

/// Name of the built-in attribute holding an element's type.
const REQUIREMENT_TYPE_ATTRIBUTE: &str = "isRequirement";

/// Largest id or index an in-line link can carry.
const LINK_FIELD_MAX: i64 = 999_999;

/// Built-in element fields addressable by in-line links, with their index.
const BUILTIN_LINK_FIELDS: [(&str, i64); 3] = [("Code", 1), ("Name", 2), ("Description", 3)];

/// The field an in-line link points at.
#[derive(Debug, Clone, Copy)]
pub enum LinkField<'a> {
    /// `"Code"`, `"Name"` or `"Description"`.
    Name(&'a str),
    /// A raw field index.
    Index(i64),
    /// An attribute, addressed by its id.
    Attribute(&'a Attribute),
}

impl<'a> From<&'a str> for LinkField<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl From<i64> for LinkField<'_> {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl<'a> From<&'a Attribute> for LinkField<'a> {
    fn from(attribute: &'a Attribute) -> Self {
        Self::Attribute(attribute)
    }
}

impl LinkField<'_> {
    /// Field index and display label.
    fn resolve(&self) -> Result<(i64, String)> {
        match *self {
            Self::Name(name) => BUILTIN_LINK_FIELDS
                .iter()
                .find(|(builtin, _)| *builtin == name)
                .map(|(builtin, index)| (*index, (*builtin).to_string()))
                .ok_or(VisureError::InvalidArgument),
            Self::Index(index) => {
                let label = BUILTIN_LINK_FIELDS
                    .iter()
                    .find(|(_, builtin)| *builtin == index)
                    .map_or_else(|| index.to_string(), |(name, _)| (*name).to_string());
                Ok((index, label))
            }
            Self::Attribute(attribute) => {
                let id = attribute.require_id()?;
                let label = attribute.name.clone().unwrap_or_else(|| id.to_string());
                Ok((id, label))
            }
        }
    }
}

/// An element (requirement, heading, text…) inside a specification.
///
/// First-class fields are promoted out of the server data; everything else
/// is kept hydrated in [`Element::extra`].
#[derive(Debug, Clone, Serialize)]
pub struct Element {
    #[serde(skip)]
    project: Arc<ProjectShared>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// A promoted key whose value has an unexpected type lands here
    /// instead, so each key is serialized once.
    #[serde(flatten)]
    extra: BTreeMap<String, Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<Vec<Attribute>>,
}

impl HydrationTarget for Element {
    fn set_field(&mut self, key: String, value: Field) {
        match (key.as_str(), value) {
            ("id", Field::Value(Value::Number(n))) if n.is_i64() => self.id = n.as_i64(),
            ("name", Field::Value(Value::String(s))) => self.name = Some(s),
            ("code", Field::Value(Value::String(s))) => self.code = Some(s),
            ("description", Field::Value(Value::String(s))) => self.description = Some(s),
            ("attributes", Field::Attributes(attributes)) => self.attributes = Some(attributes),
            (_, value) => {
                self.extra.insert(key, value);
            }
        }
    }
}

impl FromData for Element {
    fn from_data(raw: &Value, ctx: &HydrationContext<'_>) -> Result<Self> {
        let project = ctx.project().cloned().ok_or(VisureError::ProjectUnavailable)?;
        let Value::Object(map) = raw else {
            return Err(VisureError::ParseError(
                <serde_json::Error as serde::de::Error>::custom("element data is not a JSON object"),
            ));
        };

        let mut element = Self::empty(project);
        let id = map.get("id").and_then(Value::as_i64);
        let ctx = ctx.with_owner(id.map(Owner::Element));

        for (key, value) in map {
            let parsed = if value.is_object() || ctx.registry().contains(key) {
                parse_field(key, value, &ctx)
            } else {
                Some(Field::Value(value.clone()))
            };
            if let Some(parsed) = parsed {
                element.set_field(key.clone(), parsed);
            }
        }

        Ok(element)
    }
}

impl Element {
    fn empty(project: Arc<ProjectShared>) -> Self {
        Self {
            project,
            id: None,
            name: None,
            code: None,
            description: None,
            extra: BTreeMap::new(),
            attributes: None,
        }
    }

    /// A bare element handle with only an id.
    pub(crate) fn handle(project: Arc<ProjectShared>, id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::empty(project)
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn project_id(&self) -> i64 {
        self.project.id()
    }

    pub(crate) fn require_id(&self) -> Result<i64> {
        self.id.ok_or(VisureError::MissingField {
            entity: "element",
            field: "id",
        })
    }

    /// Hydrated server fields without a first-class accessor.
    pub fn extra(&self) -> &BTreeMap<String, Field> {
        &self.extra
    }

    /// Attributes from the last fetch, `None` before the first one.
    pub fn attributes(&self) -> Option<&[Attribute]> {
        self.attributes.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes()?
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
    }

    /// Fetch the element's attributes, replacing the cached list.
    pub async fn fetch_attributes(&mut self) -> Result<&[Attribute]> {
        let id = self.require_id()?;
        let raw = rest::element::get_attributes(self.project.session().client(), id).await?;

        let ctx =
            HydrationContext::for_project(&self.project).with_owner(Some(Owner::Element(id)));
        let attributes = raw
            .iter()
            .map(|r| Attribute::from_data(r, &ctx))
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.attributes.insert(attributes);
        Ok(attributes.as_slice())
    }

    /// Rename the element on the server. The local copy is left unchanged.
    pub async fn set_name(&self, name: &str) -> Result<()> {
        rest::element::set_name(self.project.session().client(), self.require_id()?, name).await?;
        Ok(())
    }

    pub async fn set_code(&self, code: &str) -> Result<()> {
        rest::element::set_code(self.project.session().client(), self.require_id()?, code).await?;
        Ok(())
    }

    pub async fn set_description(&self, description: &str) -> Result<()> {
        rest::element::set_description(
            self.project.session().client(),
            self.require_id()?,
            description,
        )
        .await?;
        Ok(())
    }

    /// Fetch the element's description text.
    pub async fn fetch_description(&self) -> Result<Option<String>> {
        let raw =
            rest::element::get_description(self.project.session().client(), self.require_id()?)
                .await?;

        Ok(match raw {
            Value::String(text) => Some(text),
            Value::Object(map) => map
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
    }

    /// Relationship types the server allows from this element to `target`.
    pub async fn available_relationships(
        &self,
        target: impl Into<ElementRef<'_>>,
    ) -> Result<Vec<RelationshipType>> {
        let target = target.into().resolve()?;
        rest::element::get_available_relationships(
            self.project.session().client(),
            self.require_id()?,
            target,
        )
        .await
    }

    /// Link this element to `target`.
    pub async fn create_link(
        &self,
        target: impl Into<ElementRef<'_>>,
        options: LinkOptions,
    ) -> Result<Value> {
        submit_links(
            &self.project,
            vec![LinkRequest::new(self, target.into(), options)],
        )
        .await
    }

    /// Link this element to several targets in one batch.
    ///
    /// Fails without creating anything if any target has no relationship
    /// type available.
    pub async fn create_links<'a, I>(&'a self, targets: I) -> Result<Value>
    where
        I: IntoIterator<Item = (ElementRef<'a>, LinkOptions)>,
    {
        let requests = targets
            .into_iter()
            .map(|(target, options)| LinkRequest::new(self, target, options))
            .collect();
        submit_links(&self.project, requests).await
    }

    /// Set the element's type (the `isRequirement` attribute), e.g.
    /// `"Heading"` or [`RequirementType::Item`](crate::RequirementType).
    ///
    /// Loads the element's attributes and the project's attribute types
    /// first if they are missing.
    ///
    /// # Errors
    ///
    /// Returns [`VisureError::InvalidEnumValue`], listing the legal names,
    /// if `requirement_type` is not one of them.
    pub async fn set_type(&mut self, requirement_type: impl AsRef<str>) -> Result<Value> {
        let requirement_type = requirement_type.as_ref();

        if self.attributes.is_none() {
            self.fetch_attributes().await?;
        }
        if !self.project.attribute_types_loaded() {
            self.project.fetch_attribute_types().await?;
        }

        let attribute = self
            .attribute(REQUIREMENT_TYPE_ATTRIBUTE)
            .ok_or_else(|| VisureError::NotFound {
                entity_type: "attribute",
                id: REQUIREMENT_TYPE_ATTRIBUTE.to_string(),
            })?;

        let options = attribute.enum_values()?;
        let Some(value) = options
            .iter()
            .find(|v| v.name.as_deref() == Some(requirement_type))
        else {
            return Err(VisureError::InvalidEnumValue {
                value: requirement_type.to_string(),
                valid: options.iter().filter_map(|v| v.name.clone()).collect(),
            });
        };

        let value = serde_json::to_value(value)?;
        tracing::debug!(element_id = ?self.id, requirement_type, "setting element type");
        self.modify_attribute(attribute, BaseType::Enumerated, false, vec![value])
            .await
    }

    /// Overwrite an attribute's values on this element.
    pub async fn modify_attribute(
        &self,
        attribute: impl Into<AttributeRef<'_>>,
        base_type: impl Into<BaseTypeRef>,
        is_multivalued: bool,
        values: Vec<Value>,
    ) -> Result<Value> {
        let modification = AttributeModification {
            parent_id: self.require_id()?,
            id: attribute.into().resolve()?,
            base_type: base_type.into(),
            is_multivalued,
            values,
        };
        rest::element::modify_attribute(self.project.session().client(), &modification).await
    }

    /// Anchor markup referencing one field of this element.
    ///
    /// ```text
    /// <a href="#BM_VISURE_000547_000001">[547] Code</a>
    /// ```
    ///
    /// # Errors
    ///
    /// - [`VisureError::InvalidArgument`] for an unknown field name
    /// - [`VisureError::LinkFieldOverflow`] if the element id or field index
    ///   does not fit in six digits
    pub fn in_line_link<'a>(&self, field: impl Into<LinkField<'a>>) -> Result<String> {
        let element_id = self.require_id()?;
        let (index, label) = field.into().resolve()?;

        check_link_width("element id", element_id)?;
        check_link_width("field index", index)?;

        Ok(format!(
            "<a href=\"#BM_{BOOKMARK_PREFIX}_{element_id:06}_{index:06}\">[{element_id}] {label}</a>"
        ))
    }
}

fn check_link_width(field: &'static str, value: i64) -> Result<()> {
    if (0..=LINK_FIELD_MAX).contains(&value) {
        Ok(())
    } else {
        Err(VisureError::LinkFieldOverflow { field, value })
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.map_or_else(|| "None".to_string(), |id| id.to_string());
        write!(f, "Element {id} ({})", self.name.as_deref().unwrap_or("None"))
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
    fn test_in_line_link_for_code() {
        let element = Element::handle(project(), 547);
        assert_eq!(
            element.in_line_link("Code").unwrap(),
            "<a href=\"#BM_VISURE_000547_000001\">[547] Code</a>"
        );
    }

    #[test]
    fn test_in_line_link_for_index_and_attribute() {
        let project = project();
        let element = Element::handle(project.clone(), 12);
        assert_eq!(
            element.in_line_link(3_i64).unwrap(),
            "<a href=\"#BM_VISURE_000012_000003\">[12] Description</a>"
        );
        assert_eq!(
            element.in_line_link(42_i64).unwrap(),
            "<a href=\"#BM_VISURE_000012_000042\">[12] 42</a>"
        );

        let ctx = HydrationContext::for_project(&project);
        let attribute = Attribute::from_data(&json!({"id": 88, "name": "Priority"}), &ctx).unwrap();
        assert_eq!(
            element.in_line_link(&attribute).unwrap(),
            "<a href=\"#BM_VISURE_000012_000088\">[12] Priority</a>"
        );
    }

    #[test]
    fn test_in_line_link_unknown_name() {
        let element = Element::handle(project(), 1);
        assert!(matches!(
            element.in_line_link("Title").unwrap_err(),
            VisureError::InvalidArgument
        ));
        // Names are matched exactly.
        assert!(element.in_line_link("code").is_err());
    }

    #[test]
    fn test_in_line_link_overflow() {
        let element = Element::handle(project(), 1_000_000);
        assert!(matches!(
            element.in_line_link("Name").unwrap_err(),
            VisureError::LinkFieldOverflow {
                field: "element id",
                value: 1_000_000
            }
        ));

        let element = Element::handle(project(), 999_999);
        assert!(element.in_line_link("Name").is_ok());
        assert!(matches!(
            element.in_line_link(-1_i64).unwrap_err(),
            VisureError::LinkFieldOverflow { .. }
        ));
    }

    #[test]
    fn test_element_from_data_promotes_and_hydrates() {
        let project = project();
        let ctx = HydrationContext::for_project(&project);
        let element = Element::from_data(
            &json!({
                "id": 5,
                "name": "Brake pedal",
                "code": "SYS-5",
                "level": 2,
                "owner": {"name": "alice"},
                "attributes": [{"id": 40, "name": "isRequirement", "values": ["Item"]}]
            }),
            &ctx,
        )
        .unwrap();

        assert_eq!(element.id(), Some(5));
        assert_eq!(element.name.as_deref(), Some("Brake pedal"));
        assert_eq!(element.code.as_deref(), Some("SYS-5"));
        assert_eq!(element.extra().get("level").and_then(Field::as_i64), Some(2));
        assert!(matches!(element.extra().get("owner"), Some(Field::Object(_))));

        let attribute = element.attribute("isRequirement").unwrap();
        assert_eq!(attribute.owner(), Some(Owner::Element(5)));
        assert_eq!(element.to_string(), "Element 5 (Brake pedal)");
    }

    #[test]
    fn test_element_keeps_lists_verbatim() {
        let project = project();
        let ctx = HydrationContext::for_project(&project);
        let element =
            Element::from_data(&json!({"id": 6, "tags": [{"k": "v"}]}), &ctx).unwrap();
        assert_eq!(
            element.extra().get("tags"),
            Some(&Field::Value(json!([{"k": "v"}])))
        );
    }

    #[test]
    fn test_mistyped_promoted_fields_serialize_once() {
        let project = project();
        let ctx = HydrationContext::for_project(&project);
        let element =
            Element::from_data(&json!({"id": 5, "name": null, "code": 12}), &ctx).unwrap();

        assert!(element.name.is_none());
        assert!(element.code.is_none());
        assert_eq!(element.extra().get("code").and_then(Field::as_i64), Some(12));

        let output = serde_json::to_string(&element).unwrap();
        assert_eq!(output.matches("\"name\"").count(), 1);
        assert_eq!(output.matches("\"code\"").count(), 1);
        assert_eq!(
            serde_json::to_value(&element).unwrap(),
            json!({"id": 5, "name": null, "code": 12})
        );
    }

    #[test]
    fn test_element_without_id() {
        let project = project();
        let ctx = HydrationContext::for_project(&project);
        let element = Element::from_data(&json!({"name": "draft"}), &ctx).unwrap();
        assert!(element.id().is_none());
        assert!(matches!(
            element.in_line_link("Code").unwrap_err(),
            VisureError::MissingField { field: "id", .. }
        ));
    }
}
