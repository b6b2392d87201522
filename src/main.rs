use tracker_api::app_state::AppState;
use tracker_api::config::load_config;
use tracker_api::http;
use tracker_api::infra::postgres;
use tracker_api::telemetry::init_telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if exists
    let _ = dotenvy::dotenv();

    let config = load_config().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::process::exit(1);
    });

    init_telemetry(&config.telemetry);

    let pg_pool = postgres::init_postgres(&config.integrations, &config.db).await;
    if pg_pool.is_none() {
        tracing::warn!("Starting without a database; data routes will answer 503");
    }

    let app_state = AppState::new(config.service.clone(), pg_pool.clone());

    // Setup graceful shutdown
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl-c");
        tracing::info!("Shutdown signal received");
        let _ = tx.send(());
    });

    let server = http::start_server(config, app_state);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server error");
                return Err(e);
            }
        }
        _ = rx => {
            tracing::info!("Shutting down gracefully");
        }
    }

    if let Some(pool) = pg_pool {
        tracing::info!("Closing PostgreSQL connection pool");
        pool.close().await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
