//! Listener domain types: the live listener, its registry record, and
//! the wire projection shared with observers.

use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ListenerId;

/// Lifecycle status of a spawned listener.
///
/// Transitions: `Starting → Running` on successful bind,
/// `Starting → Failed` on bind or serve error. There is no path out of
/// `Failed` in the current design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerStatus {
    /// Created and registered, not yet bound.
    Starting,
    /// Bound and accepting connections.
    Running,
    /// Bind or serve failed; the registry entry is retained.
    Failed,
}

impl std::fmt::Display for ListenerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Wire projection of a listener, carried in envelope payloads and REST
/// responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerInfo {
    /// Listener identity.
    pub id: ListenerId,
    /// Port the listener was requested on.
    pub port: String,
    /// Creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Current lifecycle status, omitted when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ListenerStatus>,
}

/// Registry-owned projection of a listener.
///
/// Holds everything the registry needs to answer snapshots; the router
/// stays with the serve task and never enters the registry.
#[derive(Debug, Clone)]
pub struct ListenerRecord {
    /// Listener identity (registry map key).
    pub id: ListenerId,
    /// Port the listener was requested on.
    pub port: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: ListenerStatus,
}

impl ListenerRecord {
    /// Converts this record into its wire projection.
    #[must_use]
    pub fn to_info(&self) -> ListenerInfo {
        ListenerInfo {
            id: self.id.clone(),
            port: self.port.clone(),
            created_at: self.created_at,
            status: Some(self.status),
        }
    }
}

/// A freshly created listener: identity plus the router it will serve.
///
/// The router is the opaque "handle requests" collaborator, cloned from
/// the factory's template. Routing rules themselves are out of scope.
#[derive(Debug)]
pub struct Listener {
    /// Listener identity, immutable once assigned.
    pub id: ListenerId,
    /// Port the listener was requested on.
    pub port: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: ListenerStatus,
    /// Routes this listener will serve once bound.
    pub router: Router,
}

impl Listener {
    /// Returns the registry record for this listener.
    #[must_use]
    pub fn record(&self) -> ListenerRecord {
        ListenerRecord {
            id: self.id.clone(),
            port: self.port.clone(),
            created_at: self.created_at,
            status: self.status,
        }
    }

    /// Returns the wire projection for this listener.
    #[must_use]
    pub fn info(&self) -> ListenerInfo {
        self.record().to_info()
    }
}
