//! Request and response bodies for the REST trigger endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/listeners`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateListenerRequest {
    /// Port the new listener should bind (opaque string; validated only
    /// at bind time).
    pub port: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status string.
    pub status: String,
    /// Current timestamp (RFC3339).
    pub timestamp: String,
    /// Crate version.
    pub version: String,
}
