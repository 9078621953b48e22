use crate::views::{DatabaseHostView, DatabaseView, HostAddress};
use panel_orchestrator::Server;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::readiness_check,
        crate::routes::servers::get_server,
        crate::routes::servers::delete_server,
        crate::routes::servers::force_delete_server,
        crate::routes::servers::list_server_databases,
        crate::routes::database_hosts::list_database_hosts,
        crate::routes::database_hosts::get_database_host,
    ),
    components(schemas(Server, DatabaseView, HostAddress, DatabaseHostView)),
    tags(
        (name = "panel-api", description = "Panel application API")
    )
)]
pub struct ApiDoc;
