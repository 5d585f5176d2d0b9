//! Service layer: listener construction and orchestration.
//!
//! [`ListenerService`] composes the [`ListenerFactory`], the registry,
//! and the notification hub, isolating failures in any one step from
//! the others.

pub mod factory;
pub mod listener_service;

pub use factory::ListenerFactory;
pub use listener_service::ListenerService;
