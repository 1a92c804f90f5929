//! Visure ALM API client library.
//!
//! A Rust library for the Visure authoring REST API. A [`Visure`] handle
//! authenticates a session and exposes the project → specification →
//! element → attribute hierarchy as typed, hydrated objects that can issue
//! their own calls.
//!
//! # Quick Start
//!
//! ```no_run
//! use visureapi::{ElementQuery, LinkOptions, Visure};
//!
//! #[tokio::main]
//! async fn main() -> visureapi::Result<()> {
//!     // Authenticate from VISURE_URL / VISURE_USERNAME / VISURE_PASSWORD
//!     let mut visure = Visure::from_env().await?;
//!
//!     let project = visure.project_by_name("Braking").map(|p| p.id());
//!     let project = project.and_then(|id| visure.project_mut(id)).expect("no such project");
//!
//!     project.fetch_attribute_types().await?;
//!     project.fetch_specifications().await?;
//!
//!     let spec = &mut project.specifications_mut()[0];
//!     let elements = spec.fetch_elements(&ElementQuery::default().deep(true)).await?;
//!
//!     let (first, rest) = elements.split_first_mut().expect("empty specification");
//!     first.set_type("Heading").await?;
//!     if let Some(second) = rest.first() {
//!         first.create_link(second, LinkOptions::default()).await?;
//!     }
//!
//!     visure.logout().await
//! }
//! ```
//!
//! # Architecture
//!
//! - [`rest`] holds one async function per REST endpoint.
//! - [`hydrate`] turns raw JSON objects into [`Field`] trees, dispatching
//!   registered keys (by default `"attributes"`) to domain parsers.
//! - Every domain type implements [`FromData`] and keeps a handle on its
//!   session and project.
//!
//! Project-scoped calls make their project the server-side active project
//! first. The session tracks a single active project and only issues the
//! switch when it changes.
//!
//! # Configuration
//!
//! [`VisureConfig::from_env`] reads:
//!
//! - `VISURE_URL` (required) - Server root, e.g. `https://visure.example.com`
//! - `VISURE_USERNAME` / `VISURE_PASSWORD` (required)
//! - `VISURE_VERIFY_TLS` (optional) - `false` disables certificate checks

pub mod cli;
mod client;
mod config;
mod error;
pub mod hydrate;
mod models;
pub mod output;
pub mod rest;
mod traits;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::{VisureClient, AUTHORING_API_PATH};
pub use config::VisureConfig;
pub use error::{Result, VisureError};
pub use hydrate::{Field, Hydrated, ParserRegistry};
pub use output::PrettyPrint;

// Re-export traits
pub use traits::FromData;

// Re-export models
pub use models::{
    // Session types
    Session,
    UserProfile,
    Visure,
    // Hierarchy
    Element,
    ElementQuery,
    Group,
    LinkField,
    Project,
    Specification,
    BOOKMARK_PREFIX,
    // Attributes
    Attribute,
    EnumValue,
    Owner,
    // Links
    AttributeModification,
    AttributeRef,
    ElementRef,
    LinkOptions,
    LinkRequest,
    RelationshipPayload,
    RelationshipType,
    // Enums
    BaseType,
    BaseTypeRef,
    LicenseType,
    RequirementType,
};

pub use models::parse_attributes;
