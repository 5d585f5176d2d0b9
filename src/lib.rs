//! # listener-gateway
//!
//! Dynamic HTTP listener orchestration with a WebSocket lifecycle event
//! stream.
//!
//! The gateway spins up independent HTTP listeners at runtime and pushes
//! their lifecycle events to any number of observers over a persistent
//! WebSocket channel. The routing rules each listener serves are supplied
//! by the caller as an opaque `axum::Router` — this crate is a
//! coordination layer.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP trigger, WebSocket observers)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler + read loops (ws/)
//!     │
//!     ├── ListenerService (service/)
//!     ├── NotificationHub (hub/)
//!     │
//!     ├── ListenerRegistry (domain/)
//!     └── Envelope codec (domain/)
//! ```
//!
//! Lifecycle events flow one way: the service registers a listener,
//! encodes a `listener_created` envelope, and hands it to the hub's
//! bounded queue; a single fan-out worker delivers it to every enrolled
//! observer in publish order. A slow or broken observer is evicted
//! without stalling the rest.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod hub;
pub mod service;
pub mod ws;
