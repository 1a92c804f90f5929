//! Attribute model.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, VisureError};
use crate::hydrate::{Field, HydrationContext, RawFields};
use crate::models::ProjectShared;
use crate::traits::FromData;

/// The domain object an attribute belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Owner {
    Project(i64),
    Specification(i64),
    Element(i64),
}

/// One legal value of an enumerated attribute type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// An attribute of a project, specification or element.
///
/// The same type describes attribute *types* (from
/// [`Project::fetch_attribute_types`](crate::Project::fetch_attribute_types))
/// and attribute *values* attached to an element.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_multivalued: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    /// Legal values, set on enumerated attribute types.
    #[serde(rename = "enumValues", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<EnumValue>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<Owner>,
    #[serde(skip)]
    project: Weak<ProjectShared>,
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("values", &self.values)
            .field("is_multivalued", &self.is_multivalued)
            .field("base_type", &self.base_type)
            .field("enumeration", &self.enumeration)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.description == other.description
            && self.values == other.values
            && self.is_multivalued == other.is_multivalued
            && self.base_type == other.base_type
            && self.enumeration == other.enumeration
            && self.extra == other.extra
            && self.owner == other.owner
    }
}

impl FromData for Attribute {
    fn from_data(raw: &Value, ctx: &HydrationContext<'_>) -> Result<Self> {
        let mut fields = RawFields::from_value("attribute", raw)?;

        Ok(Self {
            id: fields.take("id"),
            name: fields.take("name"),
            description: fields.take("description"),
            values: fields.take("values").unwrap_or_default(),
            is_multivalued: fields.take("isMultivalued"),
            base_type: fields.take("baseType"),
            enumeration: fields.take("enumValues"),
            extra: fields.into_extra(),
            owner: ctx.owner(),
            project: ctx.project().map(Arc::downgrade).unwrap_or_default(),
        })
    }
}

impl Attribute {
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// The object this attribute was fetched for; fixed at construction.
    pub fn owner(&self) -> Option<Owner> {
        self.owner
    }

    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    pub(crate) fn require_id(&self) -> Result<i64> {
        self.id.ok_or(VisureError::MissingField {
            entity: "attribute",
            field: "id",
        })
    }

    /// Legal values for this attribute, looked up by name among the owning
    /// project's attribute types.
    ///
    /// # Errors
    ///
    /// - [`VisureError::AttributeTypesNotLoaded`] before
    ///   [`Project::fetch_attribute_types`](crate::Project::fetch_attribute_types)
    /// - [`VisureError::NotFound`] if no type has this attribute's name
    /// - [`VisureError::ProjectUnavailable`] if the project was dropped
    pub fn enum_values(&self) -> Result<Vec<EnumValue>> {
        let project = self.project.upgrade().ok_or(VisureError::ProjectUnavailable)?;
        let name = self.name.as_deref().ok_or(VisureError::MissingField {
            entity: "attribute",
            field: "name",
        })?;
        project.enum_values_for(name)
    }

    /// The value shown by `Display`: the first value of a single-valued
    /// attribute, the whole list otherwise.
    fn display_value(&self) -> String {
        if self.is_multivalued == Some(false) {
            match self.values.first() {
                Some(Value::String(s)) => s.clone(),
                Some(v) => v.to_string(),
                None => "None".to_string(),
            }
        } else {
            Value::Array(self.values.clone()).to_string()
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.map_or_else(|| "None".to_string(), |id| id.to_string());
        write!(
            f,
            "({id}) {} - {} - {}",
            self.name.as_deref().unwrap_or("None"),
            self.description.as_deref().unwrap_or("None"),
            self.display_value()
        )
    }
}

/// Registered parser for `"attributes"` fields.
///
/// Accepts an array of attribute objects; anything else is malformed.
pub fn parse_attributes(raw: &Value, ctx: &HydrationContext<'_>) -> Option<Field> {
    let items = raw.as_array()?;
    items
        .iter()
        .map(|item| Attribute::from_data(item, ctx))
        .collect::<Result<Vec<_>>>()
        .ok()
        .map(Field::Attributes)
}
