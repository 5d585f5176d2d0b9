//! WebSocket layer: upgrade handling and the per-connection transport
//! adapter for the notification hub.
//!
//! The endpoint at `/ws` is push-only: observers receive a greeting, a
//! registry snapshot, and broadcast envelopes. Text frames from the
//! observer are echoed back verbatim.

pub mod connection;
pub mod handler;

pub use connection::WsConnection;
pub use handler::ws_handler;
