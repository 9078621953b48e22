//! Integration tests for the application API
//!
//! Routes are exercised through the router with recording collaborators, so
//! the daemon and database hosts are observed rather than contacted.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::TestAppBuilder;
use panel_orchestrator::test_utils::{
    fixture_database, fixture_database_host, fixture_server, Call,
};
use panel_orchestrator::DaemonConnectionError;
use serde_json::Value;

#[tokio::test]
async fn test_health_does_not_require_operator() {
    let t = TestAppBuilder::new().build().await;

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = t.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = common::extract_json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "panel-api");
}

#[tokio::test]
async fn test_readiness_reports_database() {
    let t = TestAppBuilder::new().build().await;

    let request = Request::builder()
        .uri("/health/ready")
        .body(Body::empty())
        .unwrap();
    let json: Value = common::extract_json_body(t.send(request).await).await;

    assert_eq!(json["status"], "ready");
    assert_eq!(json["database"], "connected");
}

#[tokio::test]
async fn test_server_routes_require_operator() {
    let t = TestAppBuilder::new().build().await;
    let server = fixture_server(&t.store, "alpha").await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/application/servers/{}", server.id))
        .body(Body::empty())
        .unwrap();
    let response = t.send(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(t.log.calls().is_empty());
    assert!(t.store.server_exists(&server.id).await.unwrap());
}

#[tokio::test]
async fn test_get_server() {
    let t = TestAppBuilder::new().build().await;
    let server = fixture_server(&t.store, "alpha").await;

    let response = t
        .get(&format!("/api/application/servers/{}", server.id))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = common::extract_json_body(response).await;
    assert_eq!(json["id"], server.id.as_str());
    assert_eq!(json["name"], "alpha");
}

#[tokio::test]
async fn test_get_unknown_server_is_404() {
    let t = TestAppBuilder::new().build().await;

    let response = t.get("/api/application/servers/missing").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json: Value = common::extract_json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_delete_server_removes_everything() {
    let t = TestAppBuilder::new().build().await;
    let server = fixture_server(&t.store, "alpha").await;
    let host = fixture_database_host(&t.store, "primary").await;
    let first = fixture_database(&t.store, &server, &host, "s1_first").await;
    let second = fixture_database(&t.store, &server, &host, "s1_second").await;

    let response = t
        .delete(&format!("/api/application/servers/{}", server.id))
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!t.store.server_exists(&server.id).await.unwrap());
    assert!(!t.store.database_exists(&first.id).await.unwrap());
    assert!(!t.store.database_exists(&second.id).await.unwrap());
    assert_eq!(
        t.log.calls(),
        vec![
            Call::DaemonDelete(server.id.clone()),
            Call::DatabaseDelete(first.id.clone()),
            Call::DatabaseDelete(second.id.clone()),
        ]
    );
}

#[tokio::test]
async fn test_delete_unknown_server_is_404_without_remote_calls() {
    let t = TestAppBuilder::new().build().await;

    let response = t.delete("/api/application/servers/missing").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(t.log.calls().is_empty());
}

#[tokio::test]
async fn test_strict_delete_maps_daemon_error_to_502() {
    let t = TestAppBuilder::new()
        .daemon_failing(DaemonConnectionError::with_status(500, "daemon exploded"))
        .build()
        .await;
    let server = fixture_server(&t.store, "alpha").await;

    let response = t
        .delete(&format!("/api/application/servers/{}", server.id))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(t.store.server_exists(&server.id).await.unwrap());
}

#[tokio::test]
async fn test_strict_delete_treats_daemon_404_as_success() {
    let t = TestAppBuilder::new()
        .daemon_failing(DaemonConnectionError::with_status(404, "Not Found"))
        .build()
        .await;
    let server = fixture_server(&t.store, "alpha").await;

    let response = t
        .delete(&format!("/api/application/servers/{}", server.id))
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!t.store.server_exists(&server.id).await.unwrap());
}

#[tokio::test]
async fn test_strict_delete_maps_database_error_to_500() {
    let t = TestAppBuilder::new().build().await;
    let server = fixture_server(&t.store, "alpha").await;
    let host = fixture_database_host(&t.store, "primary").await;
    let database = fixture_database(&t.store, &server, &host, "s1_main").await;

    let t = TestAppBuilder::new()
        .database_failing(&database.id)
        .build_on(t.store)
        .await;

    let response = t
        .delete(&format!("/api/application/servers/{}", server.id))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(t.store.server_exists(&server.id).await.unwrap());
    assert!(t.store.database_exists(&database.id).await.unwrap());
}

#[tokio::test]
async fn test_force_delete_ignores_remote_failures() {
    let t = TestAppBuilder::new().build().await;
    let server = fixture_server(&t.store, "alpha").await;
    let host = fixture_database_host(&t.store, "primary").await;
    let database = fixture_database(&t.store, &server, &host, "s1_main").await;

    let t = TestAppBuilder::new()
        .daemon_failing(DaemonConnectionError::transport("connection refused"))
        .database_failing(&database.id)
        .build_on(t.store)
        .await;

    let response = t
        .delete(&format!("/api/application/servers/{}/force", server.id))
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!t.store.server_exists(&server.id).await.unwrap());
    assert!(!t.store.database_exists(&database.id).await.unwrap());
    assert_eq!(
        t.log.calls(),
        vec![
            Call::DaemonDelete(server.id.clone()),
            Call::DatabaseDelete(database.id.clone()),
        ]
    );
}

#[tokio::test]
async fn test_server_databases_view_hides_password() {
    let t = TestAppBuilder::new().build().await;
    let server = fixture_server(&t.store, "alpha").await;
    let host = fixture_database_host(&t.store, "primary").await;
    fixture_database(&t.store, &server, &host, "s1_main").await;

    let response = t
        .get(&format!("/api/application/servers/{}/databases", server.id))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = common::extract_json_body(response).await;
    let views = json.as_array().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0]["name"], "s1_main");
    assert_eq!(views[0]["username"], "u_s1_main");
    assert_eq!(views[0]["connections_from"], "%");
    assert_eq!(views[0]["host"]["address"], "127.0.0.1");
    assert_eq!(views[0]["host"]["port"], 3306);
    assert!(views[0].get("password").is_none());
    assert!(!json.to_string().contains("database-password"));
}

#[tokio::test]
async fn test_list_database_hosts_with_include() {
    let t = TestAppBuilder::new().build().await;
    let server = fixture_server(&t.store, "alpha").await;
    let host = fixture_database_host(&t.store, "primary").await;
    fixture_database(&t.store, &server, &host, "s1_main").await;

    let plain: Value =
        common::extract_json_body(t.get("/api/application/database-hosts").await).await;
    assert_eq!(plain.as_array().unwrap().len(), 1);
    assert!(plain[0].get("databases").is_none());
    assert!(!plain.to_string().contains("admin-password"));

    let embedded: Value = common::extract_json_body(
        t.get(&format!(
            "/api/application/database-hosts/{}?include=databases",
            host.id
        ))
        .await,
    )
    .await;
    assert_eq!(embedded["name"], "primary");
    assert_eq!(embedded["databases"][0]["name"], "s1_main");
}

#[tokio::test]
async fn test_database_host_rejects_unknown_include() {
    let t = TestAppBuilder::new().build().await;

    let response = t.get("/api/application/database-hosts?include=nodes").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_database_host_is_404() {
    let t = TestAppBuilder::new().build().await;

    let response = t.get("/api/application/database-hosts/missing").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_lists_deletion_routes() {
    let t = TestAppBuilder::new().build().await;

    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();
    let json: Value = common::extract_json_body(t.send(request).await).await;

    let paths = &json["paths"];
    assert!(paths.get("/api/application/servers/{id}").is_some());
    assert!(paths.get("/api/application/servers/{id}/force").is_some());
    assert!(paths.get("/api/application/database-hosts").is_some());
}
