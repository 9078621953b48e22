//! Response shapes for the application API.
//!
//! Credentials never leave the panel: database and host passwords have no
//! field here.

use chrono::{DateTime, Utc};
use panel_orchestrator::{Database, DatabaseHost};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HostAddress {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DatabaseView {
    pub id: String,
    pub host: HostAddress,
    pub name: String,
    pub username: String,
    pub connections_from: String,
    pub max_connections: Option<i64>,
}

impl DatabaseView {
    pub fn new(database: &Database, host: &DatabaseHost) -> Self {
        Self {
            id: database.id.clone(),
            host: HostAddress {
                address: host.host.clone(),
                port: host.port,
            },
            name: database.database.clone(),
            username: database.username.clone(),
            connections_from: database.remote.clone(),
            max_connections: database.max_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DatabaseHostView {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub max_databases: Option<i64>,
    pub node_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub databases: Option<Vec<DatabaseView>>,
}

impl DatabaseHostView {
    pub fn new(host: &DatabaseHost) -> Self {
        Self {
            id: host.id.clone(),
            name: host.name.clone(),
            host: host.host.clone(),
            port: host.port,
            username: host.username.clone(),
            max_databases: host.max_databases,
            node_id: host.node_id.clone(),
            created_at: host.created_at,
            updated_at: host.updated_at,
            databases: None,
        }
    }

    pub fn with_databases(mut self, host: &DatabaseHost, databases: &[Database]) -> Self {
        self.databases = Some(
            databases
                .iter()
                .map(|d| DatabaseView::new(d, host))
                .collect(),
        );
        self
    }
}
