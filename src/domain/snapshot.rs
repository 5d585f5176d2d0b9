//! Capability-scoped snapshot access.
//!
//! The notification hub only ever needs a point-in-time view of the
//! registry, so it receives this narrow capability at construction
//! instead of a reference to the full registry (and never through
//! ambient global state).

use async_trait::async_trait;

use super::ListenerInfo;

/// Read-only capability for taking a point-in-time listener snapshot.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Returns a consistent copy of the current listener set.
    async fn snapshot(&self) -> Vec<ListenerInfo>;
}
