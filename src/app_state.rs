//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use tokio::sync::watch;

use crate::hub::NotificationHub;
use crate::service::ListenerService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Orchestration service for listener creation.
    pub listener_service: Arc<ListenerService>,
    /// Notification hub for observer connections.
    pub hub: NotificationHub,
    /// Process-wide shutdown signal, cloned into connection tasks.
    pub shutdown: watch::Receiver<bool>,
}
