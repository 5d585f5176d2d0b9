//! Concurrent listener storage.
//!
//! [`ListenerRegistry`] is the exclusive authority over the
//! identity → listener mapping. A single `RwLock<HashMap<...>>` gives the
//! classic single-writer/multi-reader discipline: unlimited concurrent
//! snapshot readers, writers exclude everyone.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::snapshot::SnapshotSource;
use super::{ListenerId, ListenerInfo, ListenerRecord, ListenerStatus};

/// Central store for all spawned listeners.
///
/// # Concurrency
///
/// - Any number of tasks may snapshot concurrently.
/// - At most one writer; writers exclude all readers and other writers.
/// - [`ListenerRegistry::snapshot`] copies entries rather than exposing
///   internal storage, so no iterate-while-mutate hazard exists.
///
/// Entries are never removed: listeners run for the process lifetime.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<ListenerId, ListenerRecord>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a listener record under the exclusive lock.
    ///
    /// Overwrites silently if the identity already exists; identity
    /// uniqueness is the factory's responsibility.
    pub async fn add(&self, record: ListenerRecord) {
        let mut map = self.listeners.write().await;
        map.insert(record.id.clone(), record);
    }

    /// Returns a copy of every listener as of a single consistent instant.
    ///
    /// The shared lock is released before the result is returned, so the
    /// snapshot makes no freshness guarantee. Entries are sorted by
    /// identity for stable output.
    pub async fn snapshot(&self) -> Vec<ListenerInfo> {
        let mut infos: Vec<ListenerInfo> = {
            let map = self.listeners.read().await;
            map.values().map(ListenerRecord::to_info).collect()
        };
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    /// Updates the status of an existing listener.
    ///
    /// Returns `false` if no listener with the given identity exists.
    pub async fn set_status(&self, id: &ListenerId, status: ListenerStatus) -> bool {
        let mut map = self.listeners.write().await;
        match map.get_mut(id) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    /// Returns the number of registered listeners.
    pub async fn count(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Returns `true` if no listeners are registered.
    pub async fn is_empty(&self) -> bool {
        self.listeners.read().await.is_empty()
    }

    /// Returns the identities of all registered listeners, sorted.
    pub async fn identities(&self) -> Vec<ListenerId> {
        let mut ids: Vec<ListenerId> = {
            let map = self.listeners.read().await;
            map.keys().cloned().collect()
        };
        ids.sort();
        ids
    }
}

#[async_trait]
impl SnapshotSource for ListenerRegistry {
    async fn snapshot(&self) -> Vec<ListenerInfo> {
        ListenerRegistry::snapshot(self).await
    }
}
