//! REST handlers: listener creation trigger, registry snapshot, health.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use super::dto::{CreateListenerRequest, HealthResponse};
use crate::app_state::AppState;
use crate::error::GatewayError;

/// `POST /api/v1/listeners` — Create and start a listener.
///
/// Only creation errors surface here; bind failures happen
/// asynchronously and are reported through the push channel.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if the port is empty, or a
/// creation error from the orchestration service.
pub async fn create_listener(
    State(state): State<AppState>,
    Json(req): Json<CreateListenerRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let port = req.port.trim();
    if port.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "port must not be empty".to_string(),
        ));
    }
    let info = state.listener_service.create_and_start(port).await?;
    Ok((StatusCode::CREATED, Json(info)))
}

/// `GET /api/v1/listeners` — Point-in-time registry snapshot.
pub async fn list_listeners(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.listener_service.registry().snapshot().await;
    Json(snapshot)
}

/// `GET /health` — Service health status.
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Listener routes mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/listeners", get(list_listeners).post(create_listener))
}
