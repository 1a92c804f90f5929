//! Visure domain model types.

mod attribute;
mod element;
mod enums;
pub(crate) mod link;
mod project;
mod session;
mod specification;

pub use attribute::{parse_attributes, Attribute, EnumValue, Owner};
pub use element::{Element, LinkField, BOOKMARK_PREFIX};
pub use enums::*;
pub use link::{
    AttributeModification, AttributeRef, ElementRef, LinkOptions, LinkRequest,
    RelationshipPayload, RelationshipType,
};
pub use project::{Group, Project};
pub(crate) use project::ProjectShared;
pub use session::{Session, UserProfile, Visure};
pub use specification::{ElementQuery, Specification};
