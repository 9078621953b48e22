use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Daemon(#[from] DaemonConnectionError),

    #[error(transparent)]
    DatabaseManagement(#[from] DatabaseManagementError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrchestratorError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Failure talking to the daemon that runs a server.
///
/// `status` carries the HTTP status of the daemon's response. It is `None`
/// when no response was received at all (refused connection, timeout, missing
/// node), which is never treated as "not found".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Daemon connection error (status {}): {message}", display_status(.status))]
pub struct DaemonConnectionError {
    pub status: Option<u16>,
    pub message: String,
}

impl DaemonConnectionError {
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status
    }

    /// The daemon has no record of the server.
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

fn display_status(status: &Option<u16>) -> String {
    status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string())
}

#[derive(Error, Debug)]
pub enum DatabaseManagementError {
    #[error("Database host not found: {0}")]
    HostNotFound(String),

    #[error("Could not connect to database host {host}: {message}")]
    HostConnection { host: String, message: String },

    #[error("Query against database host {host} failed: {source}")]
    HostQuery {
        host: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Local store error: {0}")]
    Store(#[source] Box<OrchestratorError>),
}

impl DatabaseManagementError {
    pub fn store(err: impl Into<OrchestratorError>) -> Self {
        Self::Store(Box::new(err.into()))
    }
}

impl From<sqlx::Error> for DatabaseManagementError {
    fn from(err: sqlx::Error) -> Self {
        Self::store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(DaemonConnectionError::with_status(404, "gone").is_not_found());
        assert!(!DaemonConnectionError::with_status(500, "boom").is_not_found());
        assert!(!DaemonConnectionError::with_status(400, "bad request").is_not_found());
    }

    #[test]
    fn test_transport_failure_is_never_not_found() {
        let err = DaemonConnectionError::transport("connection refused");
        assert_eq!(err.status_code(), None);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_display_includes_status() {
        let err = DaemonConnectionError::with_status(502, "upstream");
        assert_eq!(
            err.to_string(),
            "Daemon connection error (status 502): upstream"
        );

        let err = DaemonConnectionError::transport("refused");
        assert_eq!(err.to_string(), "Daemon connection error (status none): refused");
    }

    #[test]
    fn test_store_error_keeps_its_source() {
        use std::error::Error as _;

        let err = DatabaseManagementError::store(OrchestratorError::not_found("Database", "d1"));

        assert_eq!(err.to_string(), "Local store error: Database not found: d1");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("Database not found: d1".to_string())
        );
        assert!(matches!(
            DatabaseManagementError::from(sqlx::Error::PoolClosed),
            DatabaseManagementError::Store(_)
        ));
    }
}
