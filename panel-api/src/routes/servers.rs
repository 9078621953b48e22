use crate::{
    auth::Operator,
    error::ApiResult,
    state::AppState,
    views::DatabaseView,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use panel_orchestrator::{DatabaseHost, Server};
use std::collections::HashMap;
use tracing::info;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/application/servers/{id}",
            get(get_server).delete(delete_server),
        )
        .route(
            "/api/application/servers/{id}/force",
            delete(force_delete_server),
        )
        .route(
            "/api/application/servers/{id}/databases",
            get(list_server_databases),
        )
}

#[utoipa::path(
    get,
    path = "/api/application/servers/{id}",
    tag = "Servers",
    params(("id" = String, Path, description = "Server id")),
    responses(
        (status = 200, description = "Server record", body = Server),
        (status = 401, description = "Missing operator header"),
        (status = 404, description = "Unknown server"),
    )
)]
pub async fn get_server(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Server>> {
    let server = state.store.get_server(&id).await?;
    Ok(Json(server))
}

#[utoipa::path(
    delete,
    path = "/api/application/servers/{id}",
    tag = "Servers",
    params(("id" = String, Path, description = "Server id")),
    responses(
        (status = 204, description = "Server, its databases and its daemon workload were removed"),
        (status = 401, description = "Missing operator header"),
        (status = 404, description = "Unknown server"),
        (status = 500, description = "A database could not be removed from its host"),
        (status = 502, description = "The daemon rejected the deletion"),
    )
)]
pub async fn delete_server(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    run_deletion(&state, &operator, &id, false).await
}

#[utoipa::path(
    delete,
    path = "/api/application/servers/{id}/force",
    tag = "Servers",
    params(("id" = String, Path, description = "Server id")),
    responses(
        (status = 204, description = "Server removed; remote failures were ignored"),
        (status = 401, description = "Missing operator header"),
        (status = 404, description = "Unknown server"),
    )
)]
pub async fn force_delete_server(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    run_deletion(&state, &operator, &id, true).await
}

async fn run_deletion(
    state: &AppState,
    operator: &Operator,
    id: &str,
    force: bool,
) -> ApiResult<StatusCode> {
    let server = state.store.get_server(id).await?;

    info!(
        server_id = %server.id,
        operator = %operator.username,
        force,
        "Deleting server"
    );
    state.deletion.handle(&server, force).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/application/servers/{id}/databases",
    tag = "Servers",
    params(("id" = String, Path, description = "Server id")),
    responses(
        (status = 200, description = "Databases owned by the server", body = [DatabaseView]),
        (status = 401, description = "Missing operator header"),
        (status = 404, description = "Unknown server"),
    )
)]
pub async fn list_server_databases(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<DatabaseView>>> {
    let server = state.store.get_server(&id).await?;
    let databases = state.store.databases_for_server(&server.id).await?;

    let mut hosts: HashMap<String, DatabaseHost> = HashMap::new();
    let mut views = Vec::with_capacity(databases.len());

    for database in &databases {
        if !hosts.contains_key(&database.database_host_id) {
            let host = state
                .store
                .get_database_host(&database.database_host_id)
                .await?;
            hosts.insert(host.id.clone(), host);
        }
        if let Some(host) = hosts.get(&database.database_host_id) {
            views.push(DatabaseView::new(database, host));
        }
    }

    Ok(Json(views))
}
