//! Entities mirrored between the local store, the daemon and database hosts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A machine running the daemon that owns live server workloads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub scheme: String,
    pub fqdn: String,
    pub daemon_port: u16,

    #[serde(skip_serializing)]
    pub daemon_token: String,

    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(serialize_with = "serialize_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Base URL of the daemon API on this node.
    pub fn daemon_base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.fqdn, self.daemon_port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateNodeRequest {
    pub name: String,
    pub scheme: Option<String>,
    pub fqdn: String,
    pub daemon_port: Option<u16>,
    pub daemon_token: String,
}

/// The authoritative local record of a provisioned workload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub node_id: String,

    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(serialize_with = "serialize_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateServerRequest {
    pub name: String,
    pub node_id: String,
}

/// An external database server holding schemas on behalf of servers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DatabaseHost {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,

    #[serde(skip_serializing)]
    pub password: String,

    pub max_databases: Option<i64>,
    pub node_id: Option<String>,

    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(serialize_with = "serialize_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDatabaseHostRequest {
    pub name: String,
    pub host: String,
    pub port: Option<u16>,
    pub username: String,
    pub password: String,
    pub max_databases: Option<i64>,
    pub node_id: Option<String>,
}

/// A credentialed schema on a [`DatabaseHost`] owned by a [`Server`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Database {
    pub id: String,
    pub server_id: String,
    pub database_host_id: String,

    /// Schema name on the host.
    pub database: String,
    pub username: String,

    #[serde(skip_serializing)]
    pub password: String,

    /// Host pattern the principal may connect from (`%` for anywhere).
    pub remote: String,
    pub max_connections: Option<i64>,

    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(serialize_with = "serialize_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDatabaseRequest {
    pub server_id: String,
    pub database_host_id: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub remote: Option<String>,
    pub max_connections: Option<i64>,
}

// Serialize DateTime as RFC 3339 / ISO 8601 string
fn serialize_datetime<S>(dt: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}
