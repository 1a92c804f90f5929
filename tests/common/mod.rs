//! Shared wiremock helpers for the integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use visureapi::{Visure, VisureConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Full request path of an authoring API endpoint.
pub fn api(endpoint: &str) -> String {
    format!("/visureauthoring8/api/v1/{endpoint}")
}

/// Login response carrying a token and the given projects.
pub fn login_body(projects: Value) -> Value {
    json!({
        "accessToken": {"token": "test-token", "refreshToken": "test-refresh"},
        "id": 7,
        "username": "alice",
        "projects": projects
    })
}

/// One project with a single group.
pub fn project(id: i64, name: &str) -> Value {
    json!({"id": id, "name": name, "groups": [{"id": id * 10, "name": "Authors"}]})
}

/// Mount a successful login listing `projects`.
pub async fn mount_login(server: &MockServer, projects: Value) {
    Mock::given(method("POST"))
        .and(path(api("authenticate")))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(projects)))
        .mount(server)
        .await;
}

/// Mount a project activation that must happen exactly `times` times.
pub async fn mount_activation(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path(api("project/current")))
        .respond_with(ResponseTemplate::new(200))
        .expect(times)
        .mount(server)
        .await;
}

/// Connect to `server` without logging out on drop.
pub async fn connect(server: &MockServer) -> Visure {
    let config = VisureConfig::new(&server.uri(), "alice", "secret").with_auto_logout(false);
    Visure::connect(config).await.expect("Failed to connect")
}
