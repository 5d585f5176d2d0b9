//! Observer connection abstraction.
//!
//! The hub writes to observers through the [`ObserverConnection`] trait
//! rather than a concrete WebSocket type, keeping the fan-out logic
//! transport-agnostic and testable with in-memory connections.

use std::fmt;

use async_trait::async_trait;

use crate::error::GatewayError;

/// Identifier the hub assigns to each enrolled observer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a connection id from a hub-allocated serial.
    #[must_use]
    pub(crate) const fn new(serial: u64) -> Self {
        Self(serial)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn_{}", self.0)
    }
}

/// Write side of a single observer connection.
///
/// Owned exclusively by the hub while enrolled. Implementations must
/// report a write failure as an error so the hub can evict the
/// connection; [`ObserverConnection::close`] is best-effort.
#[async_trait]
pub trait ObserverConnection: Send {
    /// Writes one text frame to the observer.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Delivery`] when the underlying transport
    /// rejects the write; the hub responds by removing and closing this
    /// connection.
    async fn send_text(&mut self, frame: &str) -> Result<(), GatewayError>;

    /// Closes the connection. Best-effort; errors are ignored.
    async fn close(&mut self);
}
