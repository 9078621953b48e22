//! Shared helpers for the panel-api integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use panel_api::{create_app, AppState};
use panel_orchestrator::test_utils::{
    create_test_db, CallLog, RecordingDaemon, RecordingDatabaseManager,
};
use panel_orchestrator::{DaemonConnectionError, PanelStore, ServerDeletionService};
use std::sync::Arc;
use tower::ServiceExt;

pub const OPERATOR: &str = "admin";

/// Router wired to recording fakes, plus handles to inspect what happened.
pub struct TestApp {
    pub app: Router,
    pub store: PanelStore,
    pub log: CallLog,
}

pub struct TestAppBuilder {
    daemon_failure: Option<DaemonConnectionError>,
    failing_databases: Vec<String>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            daemon_failure: None,
            failing_databases: Vec::new(),
        }
    }

    pub fn daemon_failing(mut self, failure: DaemonConnectionError) -> Self {
        self.daemon_failure = Some(failure);
        self
    }

    pub fn database_failing(mut self, database_id: &str) -> Self {
        self.failing_databases.push(database_id.to_string());
        self
    }

    pub async fn build(self) -> TestApp {
        let store = PanelStore::new(create_test_db().await);
        self.build_on(store).await
    }

    /// Build against a store that already holds fixtures.
    pub async fn build_on(self, store: PanelStore) -> TestApp {
        let log = CallLog::new();

        let daemon = match self.daemon_failure {
            Some(failure) => RecordingDaemon::failing(log.clone(), failure),
            None => RecordingDaemon::succeeding(log.clone()),
        };

        let mut databases = RecordingDatabaseManager::new(log.clone(), store.clone());
        for id in &self.failing_databases {
            databases = databases.failing_for(id);
        }

        let deletion =
            ServerDeletionService::new(store.clone(), Arc::new(daemon), Arc::new(databases));
        let app = create_app(AppState::new(store.clone(), deletion));

        TestApp { app, store, log }
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(authed("GET", uri)).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(authed("DELETE", uri)).await
    }
}

pub fn authed(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-panel-user", OPERATOR)
        .body(Body::empty())
        .unwrap()
}

pub async fn extract_json_body<T>(response: Response<Body>) -> T
where
    T: serde::de::DeserializeOwned,
{
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&body).expect("Failed to deserialize JSON")
}
