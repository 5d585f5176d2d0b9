//! listener-gateway server entry point.
//!
//! Starts the Axum server exposing the REST trigger endpoints and the
//! observer WebSocket, then spawns any seed listeners from configuration.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use listener_gateway::api;
use listener_gateway::app_state::AppState;
use listener_gateway::config::GatewayConfig;
use listener_gateway::domain::{ListenerRegistry, SnapshotSource};
use listener_gateway::hub::NotificationHub;
use listener_gateway::service::{ListenerFactory, ListenerService};
use listener_gateway::ws::ws_handler;

/// Routes served by every spawned listener. Stands in for the external
/// routing collaborator; replace with real rules as needed.
fn listener_routes() -> Router {
    Router::new().route("/", get(|| async { "listener online" }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting listener-gateway");

    // Shutdown hook: ctrl-c flips the watch signal propagated to every
    // connection task, serve task, and the fan-out worker.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    // Build domain layer
    let registry = Arc::new(ListenerRegistry::new());
    let snapshots: Arc<dyn SnapshotSource> = Arc::<ListenerRegistry>::clone(&registry);
    let hub = NotificationHub::start(config.hub_queue_capacity, snapshots, shutdown_rx.clone());

    // Build service layer
    let listener_service = Arc::new(ListenerService::new(
        ListenerFactory::new(listener_routes()),
        registry,
        hub.clone(),
        shutdown_rx.clone(),
    ));

    // Build application state
    let app_state = AppState {
        listener_service: Arc::clone(&listener_service),
        hub,
        shutdown: shutdown_rx.clone(),
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Spawn seed listeners; one failure never aborts the rest.
    for port in &config.seed_ports {
        if let Err(err) = listener_service.create_and_start(port).await {
            tracing::error!(%port, %err, "failed to create seed listener");
        }
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "gateway listening");

    let mut shutdown = shutdown_rx;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await?;

    Ok(())
}
