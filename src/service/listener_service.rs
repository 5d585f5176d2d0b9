//! Listener orchestration: create, register, notify, serve.

use std::sync::Arc;

use tokio::sync::watch;

use super::factory::ListenerFactory;
use crate::domain::{Envelope, Listener, ListenerInfo, ListenerRegistry, ListenerStatus};
use crate::error::GatewayError;
use crate::hub::NotificationHub;

/// Orchestration layer composing the factory, registry, and hub.
///
/// [`ListenerService::create_and_start`] deliberately notifies observers
/// as close as possible to registration time, before the bind outcome is
/// known: bind failure is rare and observers learn about it through a
/// correcting `listener_status` broadcast.
#[derive(Debug)]
pub struct ListenerService {
    factory: ListenerFactory,
    registry: Arc<ListenerRegistry>,
    hub: NotificationHub,
    shutdown: watch::Receiver<bool>,
}

impl ListenerService {
    /// Creates a new `ListenerService`.
    #[must_use]
    pub fn new(
        factory: ListenerFactory,
        registry: Arc<ListenerRegistry>,
        hub: NotificationHub,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            factory,
            registry,
            hub,
            shutdown,
        }
    }

    /// Returns a reference to the inner [`ListenerRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    /// Creates a listener, registers it, notifies observers, and starts
    /// serving it asynchronously.
    ///
    /// Only creation errors propagate. An envelope encoding failure is
    /// logged and swallowed; a bind or serve failure happens after this
    /// method returns and is handled by the serve task (status flip plus
    /// a correcting broadcast).
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the factory fails to construct the
    /// listener.
    pub async fn create_and_start(&self, port: &str) -> Result<ListenerInfo, GatewayError> {
        let listener = self.factory.create(port)?;
        let info = listener.info();

        self.registry.add(listener.record()).await;
        let total = self.registry.count().await;
        tracing::info!(id = %info.id, total, "listener registered");

        match Envelope::listener_created(info.clone()).encode() {
            Ok(frame) => self.hub.publish(frame).await,
            Err(err) => {
                tracing::warn!(id = %info.id, %err, "failed to encode listener_created event");
            }
        }

        self.spawn_serve(listener);
        Ok(info)
    }

    /// Spawns the long-lived serve task for a freshly created listener.
    fn spawn_serve(&self, listener: Listener) {
        let registry = Arc::clone(&self.registry);
        let hub = self.hub.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let Listener {
                id, port, router, ..
            } = listener;
            let addr = format!("0.0.0.0:{port}");

            match tokio::net::TcpListener::bind(&addr).await {
                Ok(socket) => {
                    registry.set_status(&id, ListenerStatus::Running).await;
                    tracing::info!(%id, %addr, "listener serving");

                    let mut signal = shutdown.clone();
                    let serve = axum::serve(socket, router)
                        .with_graceful_shutdown(async move {
                            let _ = signal.changed().await;
                        })
                        .await;

                    if let Err(err) = serve {
                        tracing::error!(%id, %err, "listener serve error");
                        mark_failed(&registry, &hub, &id).await;
                    }
                }
                Err(err) => {
                    tracing::error!(%id, %addr, %err, "listener failed to bind");
                    mark_failed(&registry, &hub, &id).await;
                }
            }
        });
    }
}

/// Flips the registry entry to `Failed` and broadcasts a correcting
/// `listener_status` snapshot so observers see the failure.
async fn mark_failed(
    registry: &ListenerRegistry,
    hub: &NotificationHub,
    id: &crate::domain::ListenerId,
) {
    registry.set_status(id, ListenerStatus::Failed).await;
    match Envelope::listener_status(registry.snapshot().await).encode() {
        Ok(frame) => hub.publish(frame).await,
        Err(err) => tracing::warn!(%id, %err, "failed to encode listener_status event"),
    }
}
