use anyhow::Result;
use panel_api::{create_app, AppState, Config};
use panel_orchestrator::db::{backup_database, create_pool, run_migrations};
use panel_orchestrator::{
    HttpDaemonServerRepository, MySqlDatabaseManager, PanelStore, ServerDeletionService,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    let _log_guard = panel_logging::init_subscriber(&config.log);

    info!("Starting panel-api service...");
    info!(
        "Configuration loaded: bind_addr={}, db_path={}",
        config.bind_addr,
        config.db_path.display()
    );

    let db_path = &config.db_path;

    // Backup before migrations
    if db_path.exists() {
        let backup_path = backup_database(db_path)?;
        info!("Database backed up to: {}", backup_path.display());
    }

    let pool = create_pool(db_path).await?;
    info!("Running database migrations...");
    run_migrations(&pool).await?;
    info!("Migrations complete");

    let store = PanelStore::new(pool);
    let daemon = HttpDaemonServerRepository::new(store.clone(), config.daemon_timeout())?;
    let databases = MySqlDatabaseManager::new(store.clone(), config.database_host_timeout());
    let deletion = ServerDeletionService::new(store.clone(), Arc::new(daemon), Arc::new(databases));

    let app = create_app(AppState::new(store, deletion));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
