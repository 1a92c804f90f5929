//! Project model.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, VisureError};
use crate::hydrate::{hydrate, HydrationContext, Hydrated, RawFields};
use crate::models::link::{submit_links, LinkRequest};
use crate::models::{Attribute, Element, EnumValue, Owner, Session, Specification};
use crate::rest;
use crate::traits::FromData;

/// A role/group the user holds in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A Visure project.
///
/// Projects contain specifications and define the attribute types used by
/// their elements. Most project-scoped calls first make the project the
/// server-side active project (see [`Project::activate`]).
#[derive(Debug, Clone)]
pub struct Project {
    shared: Arc<ProjectShared>,
    pub name: Option<String>,
    extra: BTreeMap<String, Value>,
    specifications: Option<Vec<Specification>>,
}

/// Project state shared with the entities inside the project.
pub(crate) struct ProjectShared {
    id: i64,
    session: Session,
    groups: Vec<Group>,
    attribute_types: RwLock<Option<Vec<Attribute>>>,
}

impl fmt::Debug for ProjectShared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectShared")
            .field("id", &self.id)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl ProjectShared {
    pub(crate) fn new(id: i64, session: Session, groups: Vec<Group>) -> Self {
        Self {
            id,
            session,
            groups,
            attribute_types: RwLock::new(None),
        }
    }

    pub(crate) fn id(&self) -> i64 {
        self.id
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    /// Make this the session's active project; `role` defaults to the
    /// first group.
    pub(crate) async fn activate(&self, role: Option<i64>) -> Result<()> {
        self.session
            .activate_project(self.id, || {
                role.or_else(|| self.groups.first().map(|g| g.id))
                    .ok_or(VisureError::MissingField {
                        entity: "project",
                        field: "groups",
                    })
            })
            .await
    }

    pub(crate) async fn fetch_attribute_types(self: &Arc<Self>) -> Result<Vec<Attribute>> {
        self.activate(None).await?;
        let raw = rest::project::get_attribute_types(self.session.client()).await?;

        let ctx = HydrationContext::for_project(self).with_owner(Some(Owner::Project(self.id)));
        let types = raw
            .iter()
            .map(|r| Attribute::from_data(r, &ctx))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(project_id = self.id, count = types.len(), "attribute types loaded");
        self.set_attribute_types(types.clone());
        Ok(types)
    }

    pub(crate) fn set_attribute_types(&self, types: Vec<Attribute>) {
        *self
            .attribute_types
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(types);
    }

    pub(crate) fn attribute_types(&self) -> Option<Vec<Attribute>> {
        self.attribute_types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn attribute_types_loaded(&self) -> bool {
        self.attribute_types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|types| !types.is_empty())
    }

    /// Legal values of the attribute type called `name`.
    pub(crate) fn enum_values_for(&self, name: &str) -> Result<Vec<EnumValue>> {
        let guard = self
            .attribute_types
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let types = guard
            .as_ref()
            .filter(|types| !types.is_empty())
            .ok_or(VisureError::AttributeTypesNotLoaded)?;

        let attribute_type = types
            .iter()
            .find(|t| t.name.as_deref() == Some(name))
            .ok_or_else(|| VisureError::NotFound {
                entity_type: "attribute type",
                id: name.to_string(),
            })?;

        attribute_type
            .enumeration
            .clone()
            .ok_or(VisureError::MissingField {
                entity: "attribute type",
                field: "enumValues",
            })
    }
}

impl FromData for Project {
    fn from_data(raw: &Value, ctx: &HydrationContext<'_>) -> Result<Self> {
        let mut fields = RawFields::from_value("project", raw)?;
        let id: i64 = fields.take("id").ok_or(VisureError::MissingField {
            entity: "project",
            field: "id",
        })?;
        let name = fields.take("name");
        let groups = fields.take("groups").unwrap_or_default();

        Ok(Self {
            shared: Arc::new(ProjectShared::new(id, ctx.session().clone(), groups)),
            name,
            extra: fields.into_extra(),
            specifications: None,
        })
    }
}

impl Project {
    pub fn id(&self) -> i64 {
        self.shared.id
    }

    pub fn groups(&self) -> &[Group] {
        &self.shared.groups
    }

    pub fn session(&self) -> &Session {
        &self.shared.session
    }

    /// Server fields without a first-class accessor.
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    /// Specifications from the last fetch, `None` before the first one.
    pub fn specifications(&self) -> Option<&[Specification]> {
        self.specifications.as_deref()
    }

    pub fn specifications_mut(&mut self) -> &mut [Specification] {
        self.specifications.as_deref_mut().unwrap_or_default()
    }

    pub fn specification(&self, id: i64) -> Option<&Specification> {
        self.specifications()?.iter().find(|s| s.id() == id)
    }

    pub fn specification_mut(&mut self, id: i64) -> Option<&mut Specification> {
        self.specifications.as_mut()?.iter_mut().find(|s| s.id() == id)
    }

    /// Attribute types from the last fetch, `None` before the first one.
    pub fn attribute_types(&self) -> Option<Vec<Attribute>> {
        self.shared.attribute_types()
    }

    /// A handle on the element with `id`, for calls that only need its id.
    pub fn element(&self, id: i64) -> Element {
        Element::handle(self.shared.clone(), id)
    }

    /// Make this the session's active project.
    ///
    /// Does nothing if it already is. Without an explicit `role` the first
    /// of the project's groups is used.
    pub async fn activate(&self, role: Option<i64>) -> Result<()> {
        self.shared.activate(role).await
    }

    /// Fetch the project's specifications, replacing the cached list.
    pub async fn fetch_specifications(&mut self) -> Result<&[Specification]> {
        self.shared.activate(None).await?;
        let raw = rest::specification::get_specifications(self.shared.session.client()).await?;

        let ctx = HydrationContext::for_project(&self.shared);
        let specifications = raw
            .iter()
            .map(|r| Specification::from_data(r, &ctx))
            .collect::<Result<Vec<_>>>()?;

        let specifications = self.specifications.insert(specifications);
        Ok(specifications.as_slice())
    }

    /// Fetch the project's attribute type definitions, replacing the cache.
    ///
    /// Needed before any [`Attribute::enum_values`] call in this project.
    pub async fn fetch_attribute_types(&self) -> Result<Vec<Attribute>> {
        self.shared.fetch_attribute_types().await
    }

    /// Create relationships between elements in one batch.
    ///
    /// Entries without a relationship type get the first type the server
    /// offers for their source/target pair. Nothing is submitted unless
    /// every entry resolves.
    pub async fn create_links(&self, requests: Vec<LinkRequest<'_>>) -> Result<Value> {
        submit_links(&self.shared, requests).await
    }

    /// Fetch the project's detail record.
    pub async fn fetch_details(&self) -> Result<Hydrated> {
        let raw = rest::project::get_project_info(self.shared.session.client(), self.id()).await?;
        let ctx = HydrationContext::for_project(&self.shared)
            .with_owner(Some(Owner::Project(self.id())));

        match raw {
            Value::Object(map) => Ok(hydrate(&map, &ctx)),
            _ => Ok(Hydrated::new()),
        }
    }

    /// Fetch the project's detail record and merge it into this project.
    pub async fn refresh_details(&mut self) -> Result<()> {
        let raw = rest::project::get_project_info(self.shared.session.client(), self.id()).await?;
        let mut fields = RawFields::from_value("project", &raw)?;

        // Identity and groups are fixed at construction.
        let _ = fields.take::<Value>("id");
        let _ = fields.take::<Value>("groups");
        if let Some(name) = fields.take("name") {
            self.name = Some(name);
        }
        self.extra.extend(fields.into_extra());
        Ok(())
    }
}

impl Serialize for Project {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id())?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("groups", self.groups())?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        if let Some(specifications) = &self.specifications {
            map.serialize_entry("specifications", specifications)?;
        }
        map.end()
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Visure Project {} ({})",
            self.id(),
            self.name.as_deref().unwrap_or("unnamed")
        )
    }
}
