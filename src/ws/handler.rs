//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;
use futures_util::StreamExt;

use super::connection::{WsConnection, run_read_loop};
use crate::app_state::AppState;

/// `GET /ws` — Upgrade HTTP connection to the observer push channel.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let hub = state.hub.clone();
    let shutdown = state.shutdown.clone();

    ws.on_upgrade(move |socket| async move {
        let (sink, stream) = socket.split();
        match hub.accept(Box::new(WsConnection::new(sink))).await {
            Ok(id) => run_read_loop(stream, hub, id, shutdown).await,
            Err(err) => tracing::warn!(%err, "observer handshake failed"),
        }
    })
}
