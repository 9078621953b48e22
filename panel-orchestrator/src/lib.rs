//! Server lifecycle business logic
//!
//! This crate owns the local store for nodes, servers, database hosts and
//! databases, the clients for the daemon and for database hosts, and the
//! deletion orchestration that keeps all three consistent. It is consumed by
//! the panel-api HTTP service but can also be driven directly.

pub mod daemon;
pub mod databases;
pub mod db;
pub mod deletion;
pub mod error;
pub mod models;
pub mod store;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use daemon::{DaemonServerRepository, HttpDaemonServerRepository};
pub use databases::{DatabaseManagementService, MySqlDatabaseManager};
pub use deletion::ServerDeletionService;
pub use error::{DaemonConnectionError, DatabaseManagementError, OrchestratorError, Result};
pub use models::{
    CreateDatabaseHostRequest, CreateDatabaseRequest, CreateNodeRequest, CreateServerRequest,
    Database, DatabaseHost, Node, Server,
};
pub use store::PanelStore;
