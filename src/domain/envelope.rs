//! Message envelope codec for the observer push channel.
//!
//! Every event pushed to observers is wrapped in an [`Envelope`]:
//!
//! ```json
//! {
//!   "type": "listener_created",
//!   "payload": { "id": "listener_000001", "port": "7777", "createdAt": "..." },
//!   "time": "2026-08-29T12:00:00Z"
//! }
//! ```
//!
//! `listener_status` envelopes carry an array of listener infos instead of
//! a single object.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ListenerInfo;
use crate::error::GatewayError;

/// Envelope type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    /// A single listener was created.
    ListenerCreated,
    /// Full registry snapshot.
    ListenerStatus,
}

/// Variant-specific envelope payload: one listener info or a sequence.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EnvelopePayload {
    /// Payload of a `listener_created` envelope.
    Listener(ListenerInfo),
    /// Payload of a `listener_status` envelope.
    Listeners(Vec<ListenerInfo>),
}

/// Typed, timestamped wire wrapper around a published event.
///
/// Immutable value type; constructed, encoded, and handed to the hub.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    /// Variant-specific payload.
    pub payload: EnvelopePayload,
    /// Envelope construction timestamp.
    pub time: DateTime<Utc>,
}

impl Envelope {
    /// Builds a `listener_created` envelope for a single listener.
    #[must_use]
    pub fn listener_created(info: ListenerInfo) -> Self {
        Self {
            kind: EnvelopeKind::ListenerCreated,
            payload: EnvelopePayload::Listener(info),
            time: Utc::now(),
        }
    }

    /// Builds a `listener_status` envelope from a registry snapshot.
    #[must_use]
    pub fn listener_status(infos: Vec<ListenerInfo>) -> Self {
        Self {
            kind: EnvelopeKind::ListenerStatus,
            payload: EnvelopePayload::Listeners(infos),
            time: Utc::now(),
        }
    }

    /// Serializes the envelope into its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Encoding`] if serialization fails.
    pub fn encode(&self) -> Result<String, GatewayError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ListenerId, ListenerStatus};

    fn make_info(serial: u64, port: &str) -> ListenerInfo {
        ListenerInfo {
            id: ListenerId::from_serial(serial),
            port: port.to_string(),
            created_at: Utc::now(),
            status: Some(ListenerStatus::Starting),
        }
    }

    #[test]
    fn listener_created_encodes_object_payload() {
        let envelope = Envelope::listener_created(make_info(1, "7777"));
        let Ok(frame) = envelope.encode() else {
            panic!("encode failed");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&frame) else {
            panic!("frame is not valid JSON");
        };
        assert_eq!(
            value.get("type").and_then(|t| t.as_str()),
            Some("listener_created")
        );
        let payload = value.get("payload");
        assert!(payload.is_some_and(serde_json::Value::is_object));
        assert_eq!(
            payload
                .and_then(|p| p.get("id"))
                .and_then(|id| id.as_str()),
            Some("listener_000001")
        );
        assert!(value.get("time").is_some());
    }

    #[test]
    fn listener_status_encodes_array_payload() {
        let envelope =
            Envelope::listener_status(vec![make_info(1, "7777"), make_info(2, "8888")]);
        let Ok(frame) = envelope.encode() else {
            panic!("encode failed");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&frame) else {
            panic!("frame is not valid JSON");
        };
        assert_eq!(
            value.get("type").and_then(|t| t.as_str()),
            Some("listener_status")
        );
        let payload = value.get("payload").and_then(|p| p.as_array());
        assert_eq!(payload.map(Vec::len), Some(2));
    }

    #[test]
    fn empty_status_payload_is_an_empty_array() {
        let envelope = Envelope::listener_status(Vec::new());
        let Ok(frame) = envelope.encode() else {
            panic!("encode failed");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&frame) else {
            panic!("frame is not valid JSON");
        };
        let payload = value.get("payload").and_then(|p| p.as_array());
        assert_eq!(payload.map(Vec::len), Some(0));
    }

    #[test]
    fn time_is_rfc3339() {
        let envelope = Envelope::listener_created(make_info(1, "7777"));
        let Ok(value) = serde_json::to_value(&envelope) else {
            panic!("serialization failed");
        };
        let time = value.get("time").and_then(|t| t.as_str());
        let Some(time) = time else {
            panic!("missing time field");
        };
        assert!(DateTime::parse_from_rfc3339(time).is_ok());
    }
}
