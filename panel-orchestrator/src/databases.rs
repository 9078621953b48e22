//! Removal of server databases from their hosts.

use crate::error::{DatabaseManagementError, OrchestratorError};
use crate::models::{Database, DatabaseHost};
use crate::store::PanelStore;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::MySqlPool;
use std::time::Duration;
use tracing::{info, instrument};

/// Deletes a single database, on its host and locally.
///
/// Either the whole removal succeeds or an error is returned.
#[async_trait]
pub trait DatabaseManagementService: Send + Sync {
    async fn delete(&self, database: &Database) -> Result<(), DatabaseManagementError>;
}

/// Drops schemas and principals on MySQL-compatible database hosts.
pub struct MySqlDatabaseManager {
    store: PanelStore,
    connect_timeout: Duration,
}

impl MySqlDatabaseManager {
    pub fn new(store: PanelStore, connect_timeout: Duration) -> Self {
        Self {
            store,
            connect_timeout,
        }
    }

    async fn connect(&self, host: &DatabaseHost) -> Result<MySqlPool, DatabaseManagementError> {
        let options = MySqlConnectOptions::new()
            .host(&host.host)
            .port(host.port)
            .username(&host.username)
            .password(&host.password);

        MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(self.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DatabaseManagementError::HostConnection {
                host: host_label(host),
                message: e.to_string(),
            })
    }

    async fn drop_on_host(
        &self,
        host: &DatabaseHost,
        database: &Database,
    ) -> Result<(), DatabaseManagementError> {
        let statements = drop_statements(database)?;
        let pool = self.connect(host).await?;

        for statement in &statements {
            if let Err(source) = sqlx::query(statement).execute(&pool).await {
                pool.close().await;
                return Err(DatabaseManagementError::HostQuery {
                    host: host_label(host),
                    source,
                });
            }
        }

        pool.close().await;
        Ok(())
    }
}

#[async_trait]
impl DatabaseManagementService for MySqlDatabaseManager {
    #[instrument(skip(self, database), fields(database_id = %database.id, server_id = %database.server_id))]
    async fn delete(&self, database: &Database) -> Result<(), DatabaseManagementError> {
        let host = self
            .store
            .get_database_host(&database.database_host_id)
            .await
            .map_err(|e| match e {
                OrchestratorError::NotFound { .. } => {
                    DatabaseManagementError::HostNotFound(database.database_host_id.clone())
                }
                other => DatabaseManagementError::store(other),
            })?;

        self.drop_on_host(&host, database).await?;

        self.store
            .delete_database(&database.id)
            .await
            .map_err(DatabaseManagementError::store)?;

        info!(database = %database.database, host = %host_label(&host), "Database removed from host");
        Ok(())
    }
}

fn host_label(host: &DatabaseHost) -> String {
    format!("{}:{}", host.host, host.port)
}

/// Statements that remove a schema and its principal from a MySQL host.
pub fn drop_statements(database: &Database) -> Result<Vec<String>, DatabaseManagementError> {
    let schema = quote_identifier(&database.database)?;
    let username = quote_account_part(&database.username)?;
    let remote = quote_account_part(&database.remote)?;

    Ok(vec![
        format!("DROP DATABASE IF EXISTS {}", schema),
        format!("DROP USER IF EXISTS {}@{}", username, remote),
        "FLUSH PRIVILEGES".to_string(),
    ])
}

fn quote_identifier(name: &str) -> Result<String, DatabaseManagementError> {
    if name.is_empty() || name.contains('`') || name.contains('\0') {
        return Err(DatabaseManagementError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("`{}`", name))
}

fn quote_account_part(value: &str) -> Result<String, DatabaseManagementError> {
    if value.is_empty() || value.contains('\'') || value.contains('\\') || value.contains('\0') {
        return Err(DatabaseManagementError::InvalidIdentifier(value.to_string()));
    }
    Ok(format!("'{}'", value))
}
