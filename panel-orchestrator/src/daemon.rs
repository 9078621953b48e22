//! Client side of the daemon API running on each node.

use crate::error::{DaemonConnectionError, OrchestratorError, Result};
use crate::models::Server;
use crate::store::PanelStore;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Operations the panel performs against the daemon that owns a server.
///
/// Anything the daemon (or the network in between) rejects is reported as
/// [`OrchestratorError::Daemon`]. Other variants are local failures.
#[async_trait]
pub trait DaemonServerRepository: Send + Sync {
    /// Tear down the server's live workload on its node.
    async fn delete(&self, server: &Server) -> Result<()>;
}

/// Daemon repository speaking HTTP to the node recorded for each server.
pub struct HttpDaemonServerRepository {
    client: Client,
    store: PanelStore,
}

impl HttpDaemonServerRepository {
    pub fn new(store: PanelStore, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("panel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DaemonConnectionError::transport(e.to_string()))?;

        Ok(Self { client, store })
    }

    async fn server_url(&self, server: &Server) -> Result<(Url, String)> {
        // A missing node is a transport failure, never a 404. Store failures stay local.
        let node = self.store.get_node(&server.node_id).await.map_err(|e| match e {
            OrchestratorError::NotFound { .. } => {
                DaemonConnectionError::transport(format!("cannot resolve node: {}", e)).into()
            }
            other => other,
        })?;

        let url = Url::parse(&node.daemon_base_url())
            .and_then(|base| base.join(&format!("/api/servers/{}", server.id)))
            .map_err(|e| DaemonConnectionError::transport(format!("invalid daemon url: {}", e)))?;

        Ok((url, node.daemon_token))
    }
}

#[async_trait]
impl DaemonServerRepository for HttpDaemonServerRepository {
    #[instrument(skip(self, server), fields(server_id = %server.id))]
    async fn delete(&self, server: &Server) -> Result<()> {
        let (url, token) = self.server_url(server).await?;
        debug!(%url, "Sending delete to daemon");

        let response = self
            .client
            .delete(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| DaemonConnectionError::transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DaemonConnectionError::with_status(
            status.as_u16(),
            if body.is_empty() {
                status.to_string()
            } else {
                body
            },
        )
        .into())
    }
}
