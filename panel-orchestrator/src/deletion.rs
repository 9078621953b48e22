//! Server deletion across the daemon, database hosts and the local store.
//!
//! Steps always run in the same order: the daemon tears down the live
//! workload, each of the server's databases is removed from its host, and
//! finally the server row is deleted. In strict mode the first remote failure
//! aborts the deletion and leaves every not-yet-processed record in place.
//! In forced mode remote failures are logged and skipped, and databases that
//! could not be removed from their host are dropped from the local store so
//! the server row can still go. Local store errors are fatal in both modes.

use crate::daemon::DaemonServerRepository;
use crate::databases::DatabaseManagementService;
use crate::error::{OrchestratorError, Result};
use crate::models::Server;
use crate::store::PanelStore;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct ServerDeletionService {
    store: PanelStore,
    daemon: Arc<dyn DaemonServerRepository>,
    databases: Arc<dyn DatabaseManagementService>,
}

impl ServerDeletionService {
    pub fn new(
        store: PanelStore,
        daemon: Arc<dyn DaemonServerRepository>,
        databases: Arc<dyn DatabaseManagementService>,
    ) -> Self {
        Self {
            store,
            daemon,
            databases,
        }
    }

    /// Delete a server. `force` ignores daemon and database host failures.
    #[instrument(skip(self, server), fields(server_id = %server.id))]
    pub async fn handle(&self, server: &Server, force: bool) -> Result<()> {
        match self.daemon.delete(server).await {
            Ok(()) => {}
            Err(OrchestratorError::Daemon(err)) if err.is_not_found() => {
                debug!("Daemon has no record of server, treating as deleted");
            }
            Err(OrchestratorError::Daemon(err)) if force => {
                warn!(error = %err, "Ignoring daemon error during forced deletion");
            }
            Err(err) => return Err(err),
        }

        let databases = self.store.databases_for_server(&server.id).await?;

        for database in &databases {
            if let Err(err) = self.databases.delete(database).await {
                if !force {
                    return Err(err.into());
                }

                // The schema stays dangling on its host, but the row has to go
                // before the server row can.
                warn!(
                    database_id = %database.id,
                    database_host_id = %database.database_host_id,
                    error = %err,
                    "Ignoring database host error during forced deletion"
                );
                self.store.delete_database(&database.id).await?;
            }
        }

        self.store.delete_server(&server.id).await?;

        info!(databases = databases.len(), "Server deleted");
        Ok(())
    }
}
