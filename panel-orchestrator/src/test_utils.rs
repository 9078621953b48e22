//! Fixtures and recording collaborators shared by the test suites.

use crate::daemon::DaemonServerRepository;
use crate::databases::DatabaseManagementService;
use crate::error::{DaemonConnectionError, DatabaseManagementError, OrchestratorError};
use crate::models::{
    CreateDatabaseHostRequest, CreateDatabaseRequest, CreateNodeRequest, CreateServerRequest,
    Database, DatabaseHost, Node, Server,
};
use crate::store::PanelStore;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Helper to create an in-memory test database with migrations applied
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub async fn fixture_node(store: &PanelStore, fqdn: &str) -> Node {
    store
        .create_node(CreateNodeRequest {
            name: format!("node-{}", fqdn),
            scheme: Some("http".to_string()),
            fqdn: fqdn.to_string(),
            daemon_port: Some(8080),
            daemon_token: "daemon-token".to_string(),
        })
        .await
        .expect("Failed to create fixture node")
}

pub async fn fixture_server(store: &PanelStore, name: &str) -> Server {
    let node = fixture_node(store, "127.0.0.1").await;
    fixture_server_on_node(store, &node, name).await
}

pub async fn fixture_server_on_node(store: &PanelStore, node: &Node, name: &str) -> Server {
    store
        .create_server(CreateServerRequest {
            name: name.to_string(),
            node_id: node.id.clone(),
        })
        .await
        .expect("Failed to create fixture server")
}

pub async fn fixture_database_host(store: &PanelStore, name: &str) -> DatabaseHost {
    store
        .create_database_host(CreateDatabaseHostRequest {
            name: name.to_string(),
            host: "127.0.0.1".to_string(),
            port: Some(3306),
            username: "panel_admin".to_string(),
            password: "admin-password".to_string(),
            max_databases: None,
            node_id: None,
        })
        .await
        .expect("Failed to create fixture database host")
}

pub async fn fixture_database(
    store: &PanelStore,
    server: &Server,
    host: &DatabaseHost,
    name: &str,
) -> Database {
    store
        .create_database(CreateDatabaseRequest {
            server_id: server.id.clone(),
            database_host_id: host.id.clone(),
            database: name.to_string(),
            username: format!("u_{}", name),
            password: "database-password".to_string(),
            remote: None,
            max_connections: Some(10),
        })
        .await
        .expect("Failed to create fixture database")
}

/// A collaborator call observed during a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DaemonDelete(String),
    DatabaseDelete(String),
}

/// Ordered record of collaborator calls, shared between fakes.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: Call) {
        self.0.lock().expect("call log poisoned").push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().expect("call log poisoned").clone()
    }
}

/// Daemon fake that records every delete and answers with a fixed outcome.
pub struct RecordingDaemon {
    log: CallLog,
    failure: Option<DaemonConnectionError>,
}

impl RecordingDaemon {
    pub fn succeeding(log: CallLog) -> Self {
        Self { log, failure: None }
    }

    pub fn failing(log: CallLog, failure: DaemonConnectionError) -> Self {
        Self {
            log,
            failure: Some(failure),
        }
    }
}

#[async_trait]
impl DaemonServerRepository for RecordingDaemon {
    async fn delete(&self, server: &Server) -> Result<(), OrchestratorError> {
        self.log.push(Call::DaemonDelete(server.id.clone()));
        match &self.failure {
            Some(err) => Err(err.clone().into()),
            None => Ok(()),
        }
    }
}

/// Database collaborator fake.
///
/// Successful deletes remove the local row like the real collaborator does;
/// databases listed as failing are left untouched and produce an error.
pub struct RecordingDatabaseManager {
    log: CallLog,
    store: PanelStore,
    failing: HashSet<String>,
}

impl RecordingDatabaseManager {
    pub fn new(log: CallLog, store: PanelStore) -> Self {
        Self {
            log,
            store,
            failing: HashSet::new(),
        }
    }

    pub fn failing_for(mut self, database_id: &str) -> Self {
        self.failing.insert(database_id.to_string());
        self
    }
}

#[async_trait]
impl DatabaseManagementService for RecordingDatabaseManager {
    async fn delete(&self, database: &Database) -> Result<(), DatabaseManagementError> {
        self.log.push(Call::DatabaseDelete(database.id.clone()));

        if self.failing.contains(&database.id) {
            return Err(DatabaseManagementError::HostConnection {
                host: database.database_host_id.clone(),
                message: "host unreachable".to_string(),
            });
        }

        self.store
            .delete_database(&database.id)
            .await
            .map_err(DatabaseManagementError::store)
    }
}
