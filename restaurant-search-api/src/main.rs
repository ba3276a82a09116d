//! Restaurant Search API Entry Point
//!
//! Connects to OpenSearch, ensures the restaurant index exists and serves the
//! ingestion and geo-search endpoints.

use dotenv::dotenv;
use restaurant_search_api::config::LogFormat;
use restaurant_search_api::{server, ApiConfig, Dependencies, StartupError};
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) -> Result<(), StartupError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("restaurant_search_api=info,restaurant_search_repository=info")
    });

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .try_init()
                .map_err(|e| StartupError::config(e.to_string()))?;

            info!(
                service_name = "restaurant-search-api",
                service_version = env!("CARGO_PKG_VERSION"),
                "Tracing initialized with JSON format"
            );
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
                .try_init()
                .map_err(|e| StartupError::config(e.to_string()))?;

            info!(
                service_name = "restaurant-search-api",
                service_version = env!("CARGO_PKG_VERSION"),
                "Tracing initialized with console output"
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing(LogFormat::from_env())?;

    info!("Starting restaurant search API");

    let config = ApiConfig::from_env();

    // Subscribe every consumer before the signal task can fire
    let (shutdown_tx, mut connect_shutdown) = broadcast::channel::<()>(1);
    let server_shutdown = shutdown_tx.subscribe();
    server::forward_shutdown_signal(tokio::signal::ctrl_c(), shutdown_tx);

    let deps = match Dependencies::new(&config, &mut connect_shutdown).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(StartupError::ConnectionAborted) => {
            info!("Shutdown before the search engine became reachable");
            return Ok(());
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let app = server::create_app(deps.service);

    match server::run_server(app, config.server_addr(), server_shutdown).await {
        Ok(()) => {
            info!("Restaurant search API stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Restaurant search API failed");
            Err(e)
        }
    }
}
