//! Session lifecycle tests: login, refresh, logout and project activation.
//!
//! Uses wiremock to mock the authoring API.

mod common;

use common::{api, connect, login_body, mount_activation, mount_login, project};
use serde_json::json;
use visureapi::{Visure, VisureConfig, VisureError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_connect_sends_credentials_and_hydrates_projects() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api("authenticate")))
        .and(body_json(json!({
            "username": "alice",
            "password": "secret",
            "licenseType": "AUTHORING"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(json!([
            project(1, "Braking"),
            project(2, "Steering")
        ]))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let visure = connect(&mock_server).await;

    assert!(visure.session().is_authenticated());
    assert_eq!(visure.user().username.as_deref(), Some("alice"));
    assert_eq!(visure.projects().len(), 2);
    assert_eq!(
        visure.project_by_name("Steering").map(|p| p.id()),
        Some(2)
    );
    assert_eq!(visure.project(1).unwrap().groups()[0].id, 10);
}

#[tokio::test]
async fn test_connect_without_token_is_authentication_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api("authenticate")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "license unavailable"})),
        )
        .mount(&mock_server)
        .await;

    let config = VisureConfig::new(&mock_server.uri(), "alice", "secret").with_auto_logout(false);
    let err = Visure::connect(config).await.unwrap_err();

    assert!(matches!(err, VisureError::Authentication(_)));
}

#[tokio::test]
async fn test_rejected_credentials_surface_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api("authenticate")))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&mock_server)
        .await;

    let config = VisureConfig::new(&mock_server.uri(), "alice", "wrong").with_auto_logout(false);
    let err = Visure::connect(config).await.unwrap_err();

    match err {
        VisureError::ApiError {
            message,
            status_code,
        } => {
            assert_eq!(status_code, Some(401));
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("Expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, json!([])).await;

    Mock::given(method("GET"))
        .and(path(api("projects")))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([project(3, "Wipers")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut visure = connect(&mock_server).await;
    let projects = visure.fetch_projects(false).await.unwrap();

    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name.as_deref(), Some("Wipers"));
}

#[tokio::test]
async fn test_refresh_token_replaces_access_token() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, json!([])).await;

    Mock::given(method("POST"))
        .and(path(api("token/refresh")))
        .and(body_json(json!({"refreshToken": "test-refresh"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": {"token": "fresh-token", "refreshToken": "fresh-refresh"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(api("projects")))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut visure = connect(&mock_server).await;
    visure.refresh_token().await.unwrap();
    visure.fetch_projects(false).await.unwrap();
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, json!([])).await;

    Mock::given(method("POST"))
        .and(path(api("logout")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let visure = connect(&mock_server).await;
    visure.logout().await.unwrap();
    assert!(!visure.session().is_authenticated());

    // Second logout does not reach the server
    visure.logout().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_drop_logs_out_before_returning() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, json!([])).await;

    Mock::given(method("POST"))
        .and(path(api("logout")))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = VisureConfig::new(&mock_server.uri(), "alice", "secret");
    let visure = Visure::connect(config).await.unwrap();
    drop(visure);

    // Nothing left pending: the request went out inside drop.
    let logouts = mock_server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == api("logout"))
        .count();
    assert_eq!(logouts, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_drop_after_logout_sends_nothing() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, json!([])).await;

    Mock::given(method("POST"))
        .and(path(api("logout")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = VisureConfig::new(&mock_server.uri(), "alice", "secret");
    let visure = Visure::connect(config).await.unwrap();
    visure.logout().await.unwrap();
    drop(visure);
}

#[tokio::test]
async fn test_drop_on_current_thread_runtime_does_not_block() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, json!([])).await;

    Mock::given(method("POST"))
        .and(path(api("logout")))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = VisureConfig::new(&mock_server.uri(), "alice", "secret");
    let visure = Visure::connect(config).await.unwrap();
    drop(visure);
}

#[tokio::test]
async fn test_activation_is_memoized_per_project() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, json!([project(1, "Braking")])).await;

    Mock::given(method("POST"))
        .and(path(api("project/current")))
        .and(body_json(json!({"project": 1, "group": 10})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(api("specification/hierarchy/tolist")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 100, "name": "System Requirements"}
        ])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut visure = connect(&mock_server).await;
    let project = visure.project_mut(1).unwrap();

    project.fetch_specifications().await.unwrap();
    project.fetch_specifications().await.unwrap();

    assert_eq!(visure.session().active_project().await, Some(1));
}

#[tokio::test]
async fn test_switching_projects_reactivates() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, json!([project(1, "Braking"), project(2, "Steering")])).await;
    mount_activation(&mock_server, 3).await;

    Mock::given(method("GET"))
        .and(path(api("specification/hierarchy/tolist")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let mut visure = connect(&mock_server).await;

    visure.project_mut(1).unwrap().fetch_specifications().await.unwrap();
    visure.project_mut(2).unwrap().fetch_specifications().await.unwrap();
    visure.project_mut(1).unwrap().fetch_specifications().await.unwrap();
}

#[tokio::test]
async fn test_activation_server_error_is_tolerated_when_enabled() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, json!([project(1, "Braking")])).await;

    Mock::given(method("POST"))
        .and(path(api("project/current")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "already active"})))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(api("specification/hierarchy/tolist")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let strict = connect(&mock_server).await;
    let err = strict.project(1).unwrap().activate(None).await.unwrap_err();
    assert!(matches!(
        err,
        VisureError::ApiError {
            status_code: Some(500),
            ..
        }
    ));

    let config = VisureConfig::new(&mock_server.uri(), "alice", "secret")
        .with_auto_logout(false)
        .with_tolerate_activation_server_error(true);
    let mut lenient = Visure::connect(config).await.unwrap();
    let specs = lenient
        .project_mut(1)
        .unwrap()
        .fetch_specifications()
        .await
        .unwrap();
    assert!(specs.is_empty());
}

#[tokio::test]
async fn test_project_without_groups_cannot_activate() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, json!([{"id": 4, "name": "Orphan", "groups": []}])).await;
    mount_activation(&mock_server, 0).await;

    let visure = connect(&mock_server).await;
    let err = visure.project(4).unwrap().activate(None).await.unwrap_err();

    assert!(matches!(err, VisureError::MissingField { field: "groups", .. }));
}

#[tokio::test]
async fn test_explicit_role_overrides_first_group() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, json!([project(1, "Braking")])).await;

    Mock::given(method("POST"))
        .and(path(api("project/current")))
        .and(body_json(json!({"project": 1, "group": 99})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let visure = connect(&mock_server).await;
    visure.project(1).unwrap().activate(Some(99)).await.unwrap();
}
