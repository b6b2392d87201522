/// HTTP server module

pub mod middleware;
pub mod routes;

use actix_web::{web, App, HttpServer};
use std::io;

use crate::app_state::AppState;
use crate::config::Config;
use middleware::RequestTrace;

pub async fn start_server(config: Config, app_state: AppState) -> io::Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(
        service_name = %config.service.name,
        service_version = %config.service.version,
        bind_addr = %bind_addr,
        log_level = %config.telemetry.log_level,
        log_format = %config.telemetry.log_format,
        "Starting HTTP server"
    );

    let app_state = web::Data::new(app_state);
    let request_id_header = config.telemetry.request_id_header.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(RequestTrace::new(request_id_header.clone()))
            .configure(routes::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
