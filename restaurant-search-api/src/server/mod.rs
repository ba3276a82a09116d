// Server module - HTTP server setup and routing
pub mod handlers;
pub mod state;

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use restaurant_search_repository::RestaurantSearchService;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use self::state::AppState;
use crate::StartupError;

/// CORS layer allowing any origin to call the API.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Create the Axum application router with all routes and middleware
pub fn create_app(service: Arc<RestaurantSearchService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/restaurants", post(handlers::create_restaurants))
        .route("/search", get(handlers::search_restaurants))
        .route("/health", get(handlers::health_check))
        .layer(create_cors_layer())
        .with_state(state)
}

/// Broadcast on `shutdown_tx` once `signal` resolves.
///
/// If the signal cannot be listened for, the error is logged and the sender is
/// kept alive; a closed channel would otherwise read as a shutdown request.
pub fn forward_shutdown_signal<S>(signal: S, shutdown_tx: broadcast::Sender<()>) -> JoinHandle<()>
where
    S: Future<Output = io::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        match signal.await {
            Ok(()) => {
                info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        }
    })
}

/// Run the server on the specified address until `shutdown` fires
pub async fn run_server(
    app: Router,
    addr: SocketAddr,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    info!("Server listening on {}", addr);
    info!("- Ingest endpoint: http://{}/restaurants", addr);
    info!("- Search endpoint: http://{}/search", addr);
    info!("- Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            info!("Shutting down server");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::broadcast::error::TryRecvError;

    #[tokio::test]
    async fn test_signal_is_broadcast() {
        let (tx, mut rx) = broadcast::channel(1);

        forward_shutdown_signal(async { Ok(()) }, tx);

        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_error_keeps_channel_open() {
        let (tx, mut rx) = broadcast::channel(1);

        forward_shutdown_signal(async { Err(io::Error::other("signal handler unavailable")) }, tx);
        tokio::time::sleep(Duration::from_secs(3600)).await;

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
