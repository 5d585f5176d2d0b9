//! Listener factory: identity allocation and listener construction.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use chrono::Utc;

use crate::domain::{Listener, ListenerId, ListenerStatus};
use crate::error::GatewayError;

/// Constructs listeners with freshly allocated identities.
///
/// Identities come from a monotonically increasing serial, so they are
/// unique for the process lifetime. Each listener gets a clone of the
/// factory's router template; the routes themselves are supplied by the
/// caller and opaque to this crate.
#[derive(Debug)]
pub struct ListenerFactory {
    routes: Router,
    next_serial: AtomicU64,
}

impl ListenerFactory {
    /// Creates a factory that stamps every listener with a clone of
    /// `routes`.
    #[must_use]
    pub fn new(routes: Router) -> Self {
        Self {
            routes,
            next_serial: AtomicU64::new(1),
        }
    }

    /// Creates a new listener for the given port in `Starting` status.
    ///
    /// No I/O side effects; binding happens later in the serve task.
    ///
    /// # Errors
    ///
    /// Infallible under the current design; the `Result` surface is kept
    /// for the orchestration contract.
    pub fn create(&self, port: &str) -> Result<Listener, GatewayError> {
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        let id = ListenerId::from_serial(serial);
        tracing::info!(%id, port, "listener created");
        Ok(Listener {
            id,
            port: port.to_string(),
            created_at: Utc::now(),
            status: ListenerStatus::Starting,
            router: self.routes.clone(),
        })
    }
}
