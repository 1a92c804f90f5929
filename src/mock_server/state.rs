//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Visure server. Entities are
//! kept as raw JSON, exactly as the real server would send them.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Accepted credentials, username → password.
    pub credentials: HashMap<String, String>,

    /// Projects indexed by id.
    pub projects: BTreeMap<i64, Value>,

    /// Specifications per project id.
    pub specifications: BTreeMap<i64, Vec<Value>>,

    /// Elements per specification id, without the document header entry.
    pub elements: BTreeMap<i64, Vec<Value>>,

    /// Specification-level attributes per specification id.
    pub specification_attributes: BTreeMap<i64, Vec<Value>>,

    /// Attributes per element id.
    pub element_attributes: BTreeMap<i64, Vec<Value>>,

    /// Attribute type definitions per project id.
    pub attribute_types: BTreeMap<i64, Vec<Value>>,

    /// Relationship types offered for every source/target pair.
    pub relationship_types: Vec<Value>,

    /// Relationships received through `POST relationships`.
    pub relationships: Vec<Value>,

    /// Attribute modifications received, in order.
    pub attribute_modifications: Vec<Value>,

    /// Currently active project.
    pub active_project: Option<i64>,

    /// Number of `POST project/current` calls served.
    pub activation_count: usize,

    /// Token handed out by the last login, if the session is open.
    pub token: Option<String>,

    /// Refresh token handed out by the last login.
    pub refresh_token: Option<String>,

    tokens_issued: u64,
    next_element_id: i64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self {
            next_element_id: 10_000,
            ..Self::default()
        }
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Accept `username` / `password` at login.
    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.credentials
            .insert(username.to_string(), password.to_string());
        self
    }

    /// Add a project to the state.
    pub fn with_project(mut self, project: Value) -> Self {
        if let Some(id) = project.get("id").and_then(Value::as_i64) {
            self.projects.insert(id, project);
        }
        self
    }

    /// Add a specification to a project.
    pub fn with_specification(mut self, project_id: i64, specification: Value) -> Self {
        self.specifications
            .entry(project_id)
            .or_default()
            .push(specification);
        self
    }

    /// Add an element to a specification.
    pub fn with_element(mut self, specification_id: i64, element: Value) -> Self {
        self.elements
            .entry(specification_id)
            .or_default()
            .push(element);
        self
    }

    /// Set the attributes of an element.
    pub fn with_element_attributes(mut self, element_id: i64, attributes: Vec<Value>) -> Self {
        self.element_attributes.insert(element_id, attributes);
        self
    }

    /// Set the attribute types of a project.
    pub fn with_attribute_types(mut self, project_id: i64, types: Vec<Value>) -> Self {
        self.attribute_types.insert(project_id, types);
        self
    }

    /// Set the relationship types offered between any two elements.
    pub fn with_relationship_types(mut self, types: Vec<Value>) -> Self {
        self.relationship_types = types;
        self
    }

    /// Check credentials and open a session, returning the new tokens.
    pub fn login(&mut self, username: &str, password: &str) -> Option<(String, String)> {
        if self.credentials.get(username).map(String::as_str) != Some(password) {
            return None;
        }
        Some(self.issue_tokens())
    }

    /// Exchange a refresh token for new tokens.
    pub fn refresh(&mut self, refresh_token: &str) -> Option<(String, String)> {
        if self.refresh_token.as_deref() != Some(refresh_token) {
            return None;
        }
        Some(self.issue_tokens())
    }

    fn issue_tokens(&mut self) -> (String, String) {
        self.tokens_issued += 1;
        let token = format!("mock-token-{}", self.tokens_issued);
        let refresh = format!("mock-refresh-{}", self.tokens_issued);
        self.token = Some(token.clone());
        self.refresh_token = Some(refresh.clone());
        (token, refresh)
    }

    /// Close the session.
    pub fn logout(&mut self) {
        self.token = None;
        self.refresh_token = None;
        self.active_project = None;
    }

    /// Whether `token` belongs to the open session.
    pub fn is_valid_token(&self, token: &str) -> bool {
        self.token.as_deref() == Some(token)
    }

    /// Make `project_id` active. Returns false for unknown projects.
    pub fn activate(&mut self, project_id: i64) -> bool {
        if !self.projects.contains_key(&project_id) {
            return false;
        }
        self.active_project = Some(project_id);
        self.activation_count += 1;
        true
    }

    /// Projects in id order.
    pub fn list_projects(&self) -> Vec<Value> {
        self.projects.values().cloned().collect()
    }

    /// Specifications of the active project.
    pub fn active_specifications(&self) -> Option<Vec<Value>> {
        let project = self.active_project?;
        Some(self.specifications.get(&project).cloned().unwrap_or_default())
    }

    /// Attribute types of the active project.
    pub fn active_attribute_types(&self) -> Option<Vec<Value>> {
        let project = self.active_project?;
        Some(self.attribute_types.get(&project).cloned().unwrap_or_default())
    }

    /// Find a specification by id in any project.
    pub fn get_specification(&self, specification_id: i64) -> Option<&Value> {
        self.specifications
            .values()
            .flatten()
            .find(|s| s.get("id").and_then(Value::as_i64) == Some(specification_id))
    }

    /// The item list of a specification: a document header followed by its
    /// elements, optionally filtered by name/code.
    pub fn specification_items(&self, specification_id: i64, search: Option<&str>) -> Option<Vec<Value>> {
        let specification = self.get_specification(specification_id)?;

        let header = json!({
            "id": specification_id,
            "name": specification.get("name").cloned().unwrap_or(Value::Null),
            "isDocument": true
        });

        let needle = search.map(str::to_lowercase);
        let elements = self
            .elements
            .get(&specification_id)
            .into_iter()
            .flatten()
            .filter(|e| match &needle {
                Some(needle) => ["name", "code"].iter().any(|key| {
                    e.get(*key)
                        .and_then(Value::as_str)
                        .is_some_and(|v| v.to_lowercase().contains(needle))
                }),
                None => true,
            })
            .cloned();

        Some(std::iter::once(header).chain(elements).collect())
    }

    /// Find an element by id in any specification.
    pub fn get_element(&self, element_id: i64) -> Option<&Value> {
        self.elements
            .values()
            .flatten()
            .find(|e| e.get("id").and_then(Value::as_i64) == Some(element_id))
    }

    /// Mutable view on an element's fields.
    pub fn element_fields_mut(&mut self, element_id: i64) -> Option<&mut Map<String, Value>> {
        self.elements
            .values_mut()
            .flatten()
            .find(|e| e.get("id").and_then(Value::as_i64) == Some(element_id))
            .and_then(Value::as_object_mut)
    }

    /// Set one field of an element. Returns false for unknown elements.
    pub fn set_element_field(&mut self, element_id: i64, field: &str, value: &str) -> bool {
        match self.element_fields_mut(element_id) {
            Some(fields) => {
                fields.insert(field.to_string(), Value::String(value.to_string()));
                true
            }
            None => false,
        }
    }

    /// Create `count` elements in a specification and return them.
    pub fn create_elements(&mut self, specification_id: i64, parent_id: i64, count: u32) -> Option<Vec<Value>> {
        self.get_specification(specification_id)?;

        let created: Vec<Value> = (0..count)
            .map(|_| {
                self.next_element_id += 1;
                json!({
                    "id": self.next_element_id,
                    "name": "",
                    "code": format!("NEW-{}", self.next_element_id),
                    "parentId": parent_id
                })
            })
            .collect();

        self.elements
            .entry(specification_id)
            .or_default()
            .extend(created.iter().cloned());
        Some(created)
    }

    /// Record an attribute modification and apply it to the element.
    pub fn modify_attribute(&mut self, element_id: i64, modification: Value) -> bool {
        if self.get_element(element_id).is_none() {
            return false;
        }

        let attribute_id = modification.get("id").and_then(Value::as_i64);
        let values = modification.get("values").cloned().unwrap_or(Value::Null);
        if let Some(attribute) = self
            .element_attributes
            .get_mut(&element_id)
            .into_iter()
            .flatten()
            .find(|a| a.get("id").and_then(Value::as_i64) == attribute_id)
        {
            attribute["values"] = values;
        }

        self.attribute_modifications.push(modification);
        true
    }
}
