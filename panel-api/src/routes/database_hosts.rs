use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    views::DatabaseHostView,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use panel_orchestrator::{DatabaseHost, PanelStore};
use serde::Deserialize;
use utoipa::IntoParams;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/application/database-hosts", get(list_database_hosts))
        .route("/api/application/database-hosts/{id}", get(get_database_host))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IncludeQuery {
    /// Comma separated relations to embed. Only `databases` is supported.
    pub include: Option<String>,
}

impl IncludeQuery {
    fn databases(&self) -> Result<bool, ApiError> {
        let mut databases = false;
        for relation in self
            .include
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            match relation {
                "databases" => databases = true,
                other => {
                    return Err(ApiError::BadRequest(format!(
                        "Unknown include: {}",
                        other
                    )))
                }
            }
        }
        Ok(databases)
    }
}

async fn render(
    store: &PanelStore,
    host: &DatabaseHost,
    include_databases: bool,
) -> ApiResult<DatabaseHostView> {
    let view = DatabaseHostView::new(host);
    if !include_databases {
        return Ok(view);
    }

    let databases = store.databases_for_host(&host.id).await?;
    Ok(view.with_databases(host, &databases))
}

#[utoipa::path(
    get,
    path = "/api/application/database-hosts",
    tag = "Database hosts",
    params(IncludeQuery),
    responses(
        (status = 200, description = "All database hosts", body = [DatabaseHostView]),
        (status = 400, description = "Unknown include"),
        (status = 401, description = "Missing operator header"),
    )
)]
pub async fn list_database_hosts(
    State(state): State<AppState>,
    Query(query): Query<IncludeQuery>,
) -> ApiResult<Json<Vec<DatabaseHostView>>> {
    let include_databases = query.databases()?;
    let hosts = state.store.list_database_hosts().await?;

    let mut views = Vec::with_capacity(hosts.len());
    for host in &hosts {
        views.push(render(&state.store, host, include_databases).await?);
    }

    Ok(Json(views))
}

#[utoipa::path(
    get,
    path = "/api/application/database-hosts/{id}",
    tag = "Database hosts",
    params(
        ("id" = String, Path, description = "Database host id"),
        IncludeQuery,
    ),
    responses(
        (status = 200, description = "Database host", body = DatabaseHostView),
        (status = 400, description = "Unknown include"),
        (status = 401, description = "Missing operator header"),
        (status = 404, description = "Unknown database host"),
    )
)]
pub async fn get_database_host(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<IncludeQuery>,
) -> ApiResult<Json<DatabaseHostView>> {
    let include_databases = query.databases()?;
    let host = state.store.get_database_host(&id).await?;

    Ok(Json(render(&state.store, &host, include_databases).await?))
}
