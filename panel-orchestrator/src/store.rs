use crate::error::{OrchestratorError, Result};
use crate::models::{
    CreateDatabaseHostRequest, CreateDatabaseRequest, CreateNodeRequest, CreateServerRequest,
    Database, DatabaseHost, Node, Server,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::instrument;
use uuid::Uuid;

const DEFAULT_DAEMON_PORT: u16 = 8080;
const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Local authoritative store for nodes, servers, database hosts and databases.
///
/// Every mutation is a single statement, so each one commits on its own.
#[derive(Clone)]
pub struct PanelStore {
    pool: SqlitePool,
}

impl PanelStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create_node(&self, req: CreateNodeRequest) -> Result<Node> {
        require_non_empty("name", &req.name)?;
        require_non_empty("fqdn", &req.fqdn)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();
        let scheme = req.scheme.unwrap_or_else(|| "https".to_string());
        if scheme != "http" && scheme != "https" {
            return Err(OrchestratorError::InvalidInput(format!(
                "unsupported scheme: {}",
                scheme
            )));
        }

        sqlx::query(
            "INSERT INTO nodes (id, name, scheme, fqdn, daemon_port, daemon_token, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&scheme)
        .bind(&req.fqdn)
        .bind(i64::from(req.daemon_port.unwrap_or(DEFAULT_DAEMON_PORT)))
        .bind(&req.daemon_token)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_node(&id).await
    }

    pub async fn get_node(&self, id: &str) -> Result<Node> {
        let row = sqlx::query_as::<_, NodeRow>("SELECT * FROM nodes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OrchestratorError::not_found("Node", id))?;

        Ok(row.into())
    }

    pub async fn create_server(&self, req: CreateServerRequest) -> Result<Server> {
        require_non_empty("name", &req.name)?;
        self.get_node(&req.node_id).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO servers (id, name, node_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&req.node_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_server(&id).await
    }

    pub async fn get_server(&self, id: &str) -> Result<Server> {
        let row = sqlx::query_as::<_, ServerRow>("SELECT * FROM servers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OrchestratorError::not_found("Server", id))?;

        Ok(row.into())
    }

    pub async fn list_servers(&self) -> Result<Vec<Server>> {
        let rows = sqlx::query_as::<_, ServerRow>(
            "SELECT * FROM servers ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    pub async fn server_exists(&self, id: &str) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM servers WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Remove the server row. Fails while any database row still references it.
    #[instrument(skip(self))]
    pub async fn delete_server(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM servers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::not_found("Server", id));
        }

        Ok(())
    }

    pub async fn create_database_host(&self, req: CreateDatabaseHostRequest) -> Result<DatabaseHost> {
        require_non_empty("name", &req.name)?;
        require_non_empty("host", &req.host)?;
        require_non_empty("username", &req.username)?;
        if let Some(node_id) = &req.node_id {
            self.get_node(node_id).await?;
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO database_hosts (id, name, host, port, username, password, max_databases, node_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&req.host)
        .bind(i64::from(req.port.unwrap_or(DEFAULT_MYSQL_PORT)))
        .bind(&req.username)
        .bind(&req.password)
        .bind(req.max_databases)
        .bind(&req.node_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_database_host(&id).await
    }

    pub async fn get_database_host(&self, id: &str) -> Result<DatabaseHost> {
        let row = sqlx::query_as::<_, DatabaseHostRow>("SELECT * FROM database_hosts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OrchestratorError::not_found("Database host", id))?;

        Ok(row.into())
    }

    pub async fn list_database_hosts(&self) -> Result<Vec<DatabaseHost>> {
        let rows = sqlx::query_as::<_, DatabaseHostRow>(
            "SELECT * FROM database_hosts ORDER BY created_at, rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    pub async fn create_database(&self, req: CreateDatabaseRequest) -> Result<Database> {
        require_non_empty("database", &req.database)?;
        require_non_empty("username", &req.username)?;
        self.get_server(&req.server_id).await?;
        self.get_database_host(&req.database_host_id).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO databases (id, server_id, database_host_id, database, username, password, remote, max_connections, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&req.server_id)
        .bind(&req.database_host_id)
        .bind(&req.database)
        .bind(&req.username)
        .bind(&req.password)
        .bind(req.remote.as_deref().unwrap_or("%"))
        .bind(req.max_connections)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_database(&id).await
    }

    pub async fn get_database(&self, id: &str) -> Result<Database> {
        let row = sqlx::query_as::<_, DatabaseRow>("SELECT * FROM databases WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OrchestratorError::not_found("Database", id))?;

        Ok(row.into())
    }

    pub async fn database_exists(&self, id: &str) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM databases WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Databases owned by a server, in the order they were created.
    pub async fn databases_for_server(&self, server_id: &str) -> Result<Vec<Database>> {
        let rows = sqlx::query_as::<_, DatabaseRow>(
            "SELECT * FROM databases WHERE server_id = ? ORDER BY created_at, rowid",
        )
        .bind(server_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    pub async fn databases_for_host(&self, database_host_id: &str) -> Result<Vec<Database>> {
        let rows = sqlx::query_as::<_, DatabaseRow>(
            "SELECT * FROM databases WHERE database_host_id = ? ORDER BY created_at, rowid",
        )
        .bind(database_host_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    #[instrument(skip(self))]
    pub async fn delete_database(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM databases WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::not_found("Database", id));
        }

        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OrchestratorError::InvalidInput(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

fn timestamp(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

fn port(value: i64, default: u16) -> u16 {
    u16::try_from(value).unwrap_or(default)
}

// Internal row types for sqlx
#[derive(sqlx::FromRow)]
struct NodeRow {
    id: String,
    name: String,
    scheme: String,
    fqdn: String,
    daemon_port: i64,
    daemon_token: String,
    created_at: i64,
    updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct ServerRow {
    id: String,
    name: String,
    node_id: String,
    created_at: i64,
    updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct DatabaseHostRow {
    id: String,
    name: String,
    host: String,
    port: i64,
    username: String,
    password: String,
    max_databases: Option<i64>,
    node_id: Option<String>,
    created_at: i64,
    updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct DatabaseRow {
    id: String,
    server_id: String,
    database_host_id: String,
    database: String,
    username: String,
    password: String,
    remote: String,
    max_connections: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl From<NodeRow> for Node {
    fn from(row: NodeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            scheme: row.scheme,
            fqdn: row.fqdn,
            daemon_port: port(row.daemon_port, DEFAULT_DAEMON_PORT),
            daemon_token: row.daemon_token,
            created_at: timestamp(row.created_at),
            updated_at: timestamp(row.updated_at),
        }
    }
}

impl From<ServerRow> for Server {
    fn from(row: ServerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            node_id: row.node_id,
            created_at: timestamp(row.created_at),
            updated_at: timestamp(row.updated_at),
        }
    }
}

impl From<DatabaseHostRow> for DatabaseHost {
    fn from(row: DatabaseHostRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            host: row.host,
            port: port(row.port, DEFAULT_MYSQL_PORT),
            username: row.username,
            password: row.password,
            max_databases: row.max_databases,
            node_id: row.node_id,
            created_at: timestamp(row.created_at),
            updated_at: timestamp(row.updated_at),
        }
    }
}

impl From<DatabaseRow> for Database {
    fn from(row: DatabaseRow) -> Self {
        Self {
            id: row.id,
            server_id: row.server_id,
            database_host_id: row.database_host_id,
            database: row.database,
            username: row.username,
            password: row.password,
            remote: row.remote,
            max_connections: row.max_connections,
            created_at: timestamp(row.created_at),
            updated_at: timestamp(row.updated_at),
        }
    }
}
