//! Generic hydration of raw API objects.
//!
//! The Visure API returns loosely-shaped JSON objects. Hydration walks such
//! an object key by key and turns every value into a [`Field`]:
//!
//! - keys with a parser in the [`ParserRegistry`] are handed to that parser,
//!   which may produce domain types (the default registry turns any
//!   `"attributes"` array into [`Attribute`](crate::Attribute)s);
//! - nested objects become nested [`Hydrated`] containers;
//! - arrays are parsed element by element;
//! - scalars are kept as they are.
//!
//! Registered keys are honored at every depth, and the session, owning
//! project and owner travel with the [`HydrationContext`] so that domain
//! objects built deep inside a response can still talk to the server.
//!
//! ```
//! use serde_json::json;
//! use visureapi::hydrate::{hydrate, Field, HydrationContext};
//! use visureapi::{ParserRegistry, Session, VisureClient};
//!
//! let client = VisureClient::new("https://visure.example.com", true).unwrap();
//! let session = Session::new(client, ParserRegistry::default());
//! let ctx = HydrationContext::new(&session);
//!
//! let raw = json!({"meta": {"attributes": [{"id": 7, "name": "Priority"}]}});
//! let hydrated = hydrate(raw.as_object().unwrap(), &ctx);
//! let meta = hydrated.get("meta").and_then(Field::as_object).unwrap();
//! let attributes = meta.get("attributes").and_then(Field::as_attributes).unwrap();
//! assert_eq!(attributes[0].name.as_deref(), Some("Priority"));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, VisureError};
use crate::models::{parse_attributes, Attribute, Owner, ProjectShared, Session};

/// Parser for one registered field.
///
/// Returns `None` when the raw value is malformed; the field is then left
/// out of the hydrated result.
pub type FieldParser = fn(&Value, &HydrationContext<'_>) -> Option<Field>;

/// Table of field name → parser used during hydration.
///
/// Built once and owned by the [`Session`]; every hydration reads it by
/// reference.
#[derive(Clone)]
pub struct ParserRegistry {
    parsers: HashMap<String, FieldParser>,
}

impl ParserRegistry {
    /// A registry without any parsers; every field gets default parsing.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Register `parser` for `field`, returning the parser it replaces.
    pub fn register(&mut self, field: impl Into<String>, parser: FieldParser) -> Option<FieldParser> {
        self.parsers.insert(field.into(), parser)
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, parser: FieldParser) -> Self {
        self.register(field, parser);
        self
    }

    pub fn get(&self, field: &str) -> Option<FieldParser> {
        self.parsers.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.parsers.contains_key(field)
    }

    /// Registered field names, sorted.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        fields.sort_unstable();
        fields
    }
}

impl Default for ParserRegistry {
    /// The registry used by [`Visure::connect`](crate::Visure::connect):
    /// `"attributes"` arrays become [`Attribute`]s.
    fn default() -> Self {
        Self::empty().with("attributes", parse_attributes)
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.fields()).finish()
    }
}

/// References threaded through a hydration.
#[derive(Clone, Copy)]
pub struct HydrationContext<'a> {
    session: &'a Session,
    project: Option<&'a Arc<ProjectShared>>,
    owner: Option<Owner>,
}

impl std::fmt::Debug for HydrationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydrationContext")
            .field("project", &self.project_id())
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl<'a> HydrationContext<'a> {
    /// A context with no project and no owner.
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            project: None,
            owner: None,
        }
    }

    pub(crate) fn for_project(project: &'a Arc<ProjectShared>) -> Self {
        Self {
            session: project.session(),
            project: Some(project),
            owner: None,
        }
    }

    /// Same context with a different owner.
    #[must_use]
    pub fn with_owner(self, owner: Option<Owner>) -> Self {
        Self { owner, ..self }
    }

    pub fn session(&self) -> &'a Session {
        self.session
    }

    pub fn registry(&self) -> &'a ParserRegistry {
        self.session.registry()
    }

    pub(crate) fn project(&self) -> Option<&'a Arc<ProjectShared>> {
        self.project
    }

    pub fn project_id(&self) -> Option<i64> {
        self.project.map(|p| p.id())
    }

    /// The domain object the hydrated data belongs to, if any.
    pub fn owner(&self) -> Option<Owner> {
        self.owner
    }
}

/// A hydrated value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Field {
    /// A scalar, or a raw value kept verbatim.
    Value(Value),
    /// An array, parsed element by element.
    List(Vec<Field>),
    /// A nested object.
    Object(Hydrated),
    /// Output of the `"attributes"` parser.
    Attributes(Vec<Attribute>),
}

impl Field {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    pub fn as_list(&self) -> Option<&[Field]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Hydrated> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_attributes(&self) -> Option<&[Attribute]> {
        match self {
            Self::Attributes(attrs) => Some(attrs),
            _ => None,
        }
    }
}

/// Generic container produced by hydration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Hydrated {
    fields: BTreeMap<String, Field>,
}

impl Hydrated {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_fields(self) -> BTreeMap<String, Field> {
        self.fields
    }
}

/// Something hydrated fields can be set on.
pub trait HydrationTarget {
    /// Set one parsed field.
    fn set_field(&mut self, key: String, value: Field);
}

impl HydrationTarget for Hydrated {
    fn set_field(&mut self, key: String, value: Field) {
        self.fields.insert(key, value);
    }
}

/// Hydrate `data` into a fresh [`Hydrated`] container.
pub fn hydrate(data: &Map<String, Value>, ctx: &HydrationContext<'_>) -> Hydrated {
    let mut target = Hydrated::new();
    hydrate_into(&mut target, data, ctx);
    target
}

/// Hydrate every field of `data` onto `target`.
pub fn hydrate_into<T>(target: &mut T, data: &Map<String, Value>, ctx: &HydrationContext<'_>)
where
    T: HydrationTarget + ?Sized,
{
    for (key, raw) in data {
        if let Some(parsed) = parse_field(key, raw, ctx) {
            target.set_field(key.clone(), parsed);
        }
    }
}

/// Parse one field, using its registered parser if there is one.
pub fn parse_field(key: &str, raw: &Value, ctx: &HydrationContext<'_>) -> Option<Field> {
    match ctx.registry().get(key) {
        Some(parser) => {
            let parsed = parser(raw, ctx);
            if parsed.is_none() {
                tracing::debug!(field = key, "dropping malformed field");
            }
            parsed
        }
        None => Some(default_parse(raw, ctx)),
    }
}

/// Parsing for fields without a registered parser.
pub fn default_parse(raw: &Value, ctx: &HydrationContext<'_>) -> Field {
    match raw {
        Value::Object(map) => Field::Object(hydrate(map, ctx)),
        Value::Array(items) => Field::List(items.iter().map(|item| default_parse(item, ctx)).collect()),
        scalar => Field::Value(scalar.clone()),
    }
}

/// Raw object fields being promoted into a fixed schema.
///
/// Known keys are taken out with [`take`](Self::take); whatever remains
/// (unknown keys and values of an unexpected type) ends up in the entity's
/// side table.
pub(crate) struct RawFields {
    map: Map<String, Value>,
}

impl RawFields {
    pub(crate) fn from_value(entity: &'static str, raw: &Value) -> Result<Self> {
        match raw {
            Value::Object(map) => Ok(Self { map: map.clone() }),
            _ => Err(VisureError::ParseError(<serde_json::Error as serde::de::Error>::custom(
                format!("{entity} data is not a JSON object"),
            ))),
        }
    }

    /// Remove `key` and convert it, leaving it in place if the type does not fit.
    pub(crate) fn take<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.map.remove(key)?;
        match T::deserialize(&value) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::debug!(field = key, error = %err, "keeping field in side table");
                self.map.insert(key.to_string(), value);
                None
            }
        }
    }

    pub(crate) fn into_extra(self) -> BTreeMap<String, Value> {
        self.map.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VisureClient;
    use serde_json::json;

    fn session(registry: ParserRegistry) -> Session {
        let client = VisureClient::new("https://visure.example.com", true).unwrap();
        Session::new(client, registry)
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_hydration_without_registered_keys_is_idempotent() {
        let session = session(ParserRegistry::default());
        let ctx = HydrationContext::new(&session);
        let raw = object(json!({
            "id": 12,
            "title": "Brake system",
            "meta": {"owner": {"name": "alice"}, "tags": ["a", "b"]},
            "children": [{"id": 1}, {"id": 2}],
            "flag": null
        }));

        let first = hydrate(&raw, &ctx);
        let second = hydrate(&raw, &ctx);
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn test_default_parse_shapes() {
        let session = session(ParserRegistry::default());
        let ctx = HydrationContext::new(&session);
        let raw = object(json!({
            "count": 3,
            "nested": {"inner": true},
            "items": [{"x": 1}, 2]
        }));

        let hydrated = hydrate(&raw, &ctx);
        assert_eq!(hydrated.get("count").and_then(Field::as_i64), Some(3));

        let nested = hydrated.get("nested").and_then(Field::as_object).unwrap();
        assert_eq!(nested.get("inner"), Some(&Field::Value(json!(true))));

        // Maps inside a list under an unregistered key stay generic objects.
        let items = hydrated.get("items").and_then(Field::as_list).unwrap();
        assert!(matches!(items[0], Field::Object(_)));
        assert_eq!(items[1], Field::Value(json!(2)));
    }

    #[test]
    fn test_registered_parser_fires_at_depth() {
        let session = session(ParserRegistry::default());
        let ctx = HydrationContext::new(&session).with_owner(Some(Owner::Element(5)));
        let raw = object(json!({
            "attributes": [{"id": 1, "name": "Top"}],
            "level1": {
                "level2": {
                    "attributes": [{"id": 2, "name": "Deep", "values": ["x"]}]
                }
            }
        }));

        let hydrated = hydrate(&raw, &ctx);
        let top = hydrated.get("attributes").and_then(Field::as_attributes).unwrap();
        assert_eq!(top[0].name.as_deref(), Some("Top"));

        let deep = hydrated
            .get("level1")
            .and_then(Field::as_object)
            .and_then(|o| o.get("level2"))
            .and_then(Field::as_object)
            .and_then(|o| o.get("attributes"))
            .and_then(Field::as_attributes)
            .unwrap();
        assert_eq!(deep.len(), 1);
        assert_eq!(deep[0].id(), Some(2));
        assert_eq!(deep[0].owner(), Some(Owner::Element(5)));
    }

    #[test]
    fn test_malformed_registered_field_is_dropped() {
        let session = session(ParserRegistry::default());
        let ctx = HydrationContext::new(&session);
        let raw = object(json!({"attributes": "not-a-list", "name": "kept"}));

        let hydrated = hydrate(&raw, &ctx);
        assert!(!hydrated.contains("attributes"));
        assert_eq!(hydrated.get("name").and_then(Field::as_str), Some("kept"));
    }

    #[test]
    fn test_empty_registry_uses_default_parsing() {
        let session = session(ParserRegistry::empty());
        let ctx = HydrationContext::new(&session);
        let raw = object(json!({"attributes": [{"id": 1}]}));

        let hydrated = hydrate(&raw, &ctx);
        let list = hydrated.get("attributes").and_then(Field::as_list).unwrap();
        assert!(matches!(list[0], Field::Object(_)));
    }

    #[test]
    fn test_register_replaces_and_returns_previous() {
        fn shout(raw: &Value, _ctx: &HydrationContext<'_>) -> Option<Field> {
            raw.as_str().map(|s| Field::Value(Value::String(s.to_uppercase())))
        }

        let mut registry = ParserRegistry::default();
        assert!(registry.register("name", shout).is_none());
        assert!(registry.register("name", shout).is_some());
        assert_eq!(registry.fields(), vec!["attributes", "name"]);

        let session = session(registry);
        let ctx = HydrationContext::new(&session);
        let hydrated = hydrate(&object(json!({"name": "brake"})), &ctx);
        assert_eq!(hydrated.get("name").and_then(Field::as_str), Some("BRAKE"));
    }

    #[test]
    fn test_raw_fields_keeps_mismatched_types() {
        let mut fields = RawFields::from_value("thing", &json!({"id": "abc", "name": "n"})).unwrap();
        assert_eq!(fields.take::<i64>("id"), None);
        assert_eq!(fields.take::<String>("name").as_deref(), Some("n"));
        let extra = fields.into_extra();
        assert_eq!(extra.get("id"), Some(&json!("abc")));
        assert!(!extra.contains_key("name"));
    }

    #[test]
    fn test_raw_fields_rejects_non_objects() {
        assert!(RawFields::from_value("thing", &json!([1, 2])).is_err());
    }
}
