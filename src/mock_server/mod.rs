//! Mock Visure server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the Visure
//! authoring API for integration and end-to-end testing. Unlike wiremock
//! which mocks at the HTTP level per-test, this server maintains state
//! across requests (session token, active project, created elements and
//! links), enabling realistic workflow testing.
//!
//! # Example
//!
//! ```ignore
//! use visureapi::mock_server::{MockServer, DEFAULT_PASSWORD, DEFAULT_USERNAME};
//! use visureapi::{Visure, VisureConfig};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let config = VisureConfig::new(server.url(), DEFAULT_USERNAME, DEFAULT_PASSWORD);
//!     let mut visure = Visure::connect(config).await.unwrap();
//!
//!     // Server comes with default fixtures
//!     let project = visure.project_mut(1).unwrap();
//!     let specs = project.fetch_specifications().await.unwrap();
//!     assert_eq!(specs[0].name.as_deref(), Some("System Requirements"));
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::{MockServer, DEFAULT_PASSWORD, DEFAULT_USERNAME};
pub use state::MockState;
