//! Domain layer: listener identity and records, the concurrent registry,
//! the envelope codec, and the snapshot capability used by the hub.

pub mod envelope;
pub mod listener;
pub mod listener_id;
pub mod registry;
pub mod snapshot;

pub use envelope::{Envelope, EnvelopeKind, EnvelopePayload};
pub use listener::{Listener, ListenerInfo, ListenerRecord, ListenerStatus};
pub use listener_id::ListenerId;
pub use registry::ListenerRegistry;
pub use snapshot::SnapshotSource;
