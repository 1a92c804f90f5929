//! Mock Visure API server.
//!
//! Provides an axum-based HTTP server that simulates the authoring API.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::MockState;

/// Prefix every authoring route is mounted under.
const API_PREFIX: &str = "/visureauthoring8/api/v1";

/// Username accepted by the default state.
pub const DEFAULT_USERNAME: &str = "alice";

/// Password accepted by the default state.
pub const DEFAULT_PASSWORD: &str = "secret";

/// A mock Visure server for testing.
///
/// The server runs in the background and can be used to test the client
/// against a stateful implementation of the authoring API.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's root URL.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the root URL of the mock server.
    ///
    /// Use this URL as [`VisureConfig::url`](crate::VisureConfig); the
    /// client appends the authoring API path itself.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows inspecting or modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        let scenario = Fixtures::default_scenario();
        Self::state_from_scenario(scenario).with_user(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new();

        for project in scenario.projects {
            state = state.with_project(project);
        }

        for (project_id, specification) in scenario.specifications {
            state = state.with_specification(project_id, specification);
        }

        for (specification_id, element) in scenario.elements {
            state = state.with_element(specification_id, element);
        }

        for (element_id, attributes) in scenario.element_attributes {
            state = state.with_element_attributes(element_id, attributes);
        }

        for (project_id, types) in scenario.attribute_types {
            state = state.with_attribute_types(project_id, types);
        }

        state.with_relationship_types(scenario.relationship_types)
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        let api = Router::new()
            // Auth routes
            .route("/authenticate", post(handlers::authenticate))
            .route("/token/refresh", post(handlers::refresh_token))
            .route("/logout", post(handlers::logout))
            // Project routes
            .route("/projects", get(handlers::list_projects))
            .route("/project/current", post(handlers::set_active_project))
            .route("/project/attribute/types", get(handlers::get_attribute_types))
            .route("/project/:id", get(handlers::get_project))
            // Specification routes
            .route(
                "/specification/hierarchy/tolist",
                get(handlers::list_specifications),
            )
            .route("/specification/:id/items", get(handlers::list_items))
            .route(
                "/specification/:id/attributes",
                get(handlers::list_specification_attributes),
            )
            .route(
                "/specification/:id/elements",
                post(handlers::create_elements),
            )
            // Element routes
            .route(
                "/specification/element/:id/attributes",
                get(handlers::list_element_attributes),
            )
            .route(
                "/specification/element/:id/description",
                get(handlers::get_description).put(handlers::set_description),
            )
            .route("/specification/element/:id/code", put(handlers::set_code))
            .route("/specification/element/:id/name", put(handlers::set_name))
            .route(
                "/specification/element/:id/attribute",
                put(handlers::modify_attribute),
            )
            // Relationship routes
            .route(
                "/relationship/available",
                get(handlers::available_relationships),
            )
            .route("/relationships", post(handlers::create_relationships));

        Router::new()
            .nest(API_PREFIX, api)
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Visure, VisureConfig, VisureError};

    fn config(server: &MockServer) -> VisureConfig {
        VisureConfig::new(server.url(), DEFAULT_USERNAME, DEFAULT_PASSWORD).with_auto_logout(false)
    }

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        // Server should be accessible
        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_connect_lists_projects() {
        let server = MockServer::start().await;

        let visure = Visure::connect(config(&server))
            .await
            .expect("Failed to connect");

        assert_eq!(visure.projects().len(), 2);
        assert_eq!(visure.projects()[0].name.as_deref(), Some("Braking System"));
        assert_eq!(visure.user().username.as_deref(), Some(DEFAULT_USERNAME));

        visure.logout().await.unwrap();
        assert!(server.state().read().await.token.is_none());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server_rejects_login() {
        let server = MockServer::start_empty().await;

        let err = Visure::connect(config(&server)).await.unwrap_err();

        assert!(matches!(
            err,
            VisureError::ApiError {
                status_code: Some(401),
                ..
            }
        ));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_custom_state() {
        let state = MockState::new()
            .with_user("bob", "pw")
            .with_project(Fixtures::project(5, "Custom", 50, "Owners"))
            .with_specification(5, Fixtures::specification(500, "CUS", "Custom Spec"));

        let server = MockServer::with_state(state).await;
        let mut visure = Visure::connect(
            VisureConfig::new(server.url(), "bob", "pw").with_auto_logout(false),
        )
        .await
        .expect("Failed to connect");

        let project = visure.project_mut(5).expect("project 5");
        let specs = project.fetch_specifications().await.unwrap();

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].prefix.as_deref(), Some("CUS"));
        assert_eq!(server.state().read().await.active_project, Some(5));

        server.shutdown().await;
    }
}
