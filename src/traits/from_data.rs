//! FromData trait for building entities out of raw server data.

use serde_json::Value;

use crate::error::Result;
use crate::hydrate::HydrationContext;

/// Construct an entity from a raw JSON object returned by the server.
///
/// Implemented by every domain type. The context carries the session, the
/// owning project and the owner, so that the built entity can issue its own
/// calls later.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use visureapi::hydrate::HydrationContext;
/// use visureapi::{FromData, ParserRegistry, Project, Session, VisureClient};
///
/// let client = VisureClient::new("https://visure.example.com", true).unwrap();
/// let session = Session::new(client, ParserRegistry::default());
/// let ctx = HydrationContext::new(&session);
///
/// let project = Project::from_data(&json!({"id": 3, "name": "Braking"}), &ctx).unwrap();
/// assert_eq!(project.id(), 3);
/// ```
pub trait FromData: Sized {
    /// Build the entity.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an object or lacks a field the
    /// entity cannot exist without.
    fn from_data(raw: &Value, ctx: &HydrationContext<'_>) -> Result<Self>;
}
