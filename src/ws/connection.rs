//! WebSocket transport adapter for the notification hub.
//!
//! [`WsConnection`] wraps the write half of an upgraded WebSocket and
//! implements [`ObserverConnection`]; [`run_read_loop`] owns the read
//! half, echoing text frames and detecting disconnection. The read loop
//! never feeds commands back into the system.

use std::fmt;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;

use crate::error::GatewayError;
use crate::hub::{ConnectionId, NotificationHub, ObserverConnection};

/// Write half of an observer WebSocket, owned by the hub while enrolled.
pub struct WsConnection {
    sink: SplitSink<WebSocket, Message>,
}

impl WsConnection {
    /// Wraps the write half of an upgraded WebSocket.
    #[must_use]
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self { sink }
    }
}

impl fmt::Debug for WsConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsConnection").finish_non_exhaustive()
    }
}

#[async_trait]
impl ObserverConnection for WsConnection {
    async fn send_text(&mut self, frame: &str) -> Result<(), GatewayError> {
        self.sink
            .send(Message::text(frame))
            .await
            .map_err(|err| GatewayError::Delivery(err.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
        let _ = self.sink.close().await;
    }
}

/// Read loop for one observer connection.
///
/// Echoes incoming text frames back verbatim (diagnostic behavior only)
/// and disconnects the observer from the hub when the socket closes,
/// errors, or the shutdown signal fires.
pub async fn run_read_loop(
    mut stream: SplitStream<WebSocket>,
    hub: NotificationHub,
    id: ConnectionId,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!(connection = %id, frame = %text, "echoing observer frame");
                    hub.send_to(id, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(err)) => {
                    tracing::debug!(connection = %id, %err, "observer read error");
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }
    hub.disconnect(id).await;
}
