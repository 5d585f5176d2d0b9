//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the gateway HTTP/WebSocket server to
    /// (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Capacity of the notification hub's outbound queue. A full queue
    /// blocks publishers until the fan-out worker drains.
    pub hub_queue_capacity: usize,

    /// Ports to spawn listeners on at startup (comma-separated in the
    /// `LISTENER_PORTS` variable). A failure on one port never aborts
    /// the remaining ports.
    pub seed_ports: Vec<String>,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()?;

        let hub_queue_capacity = parse_env("HUB_QUEUE_CAPACITY", 100);

        let seed_ports = std::env::var("LISTENER_PORTS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            listen_addr,
            hub_queue_capacity,
            seed_ports,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
