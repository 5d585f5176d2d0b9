//! Type-safe listener identifier.
//!
//! [`ListenerId`] wraps the human-readable `listener_NNNNNN` identity
//! string. Identities come from a monotonically increasing per-factory
//! serial rather than random sampling, so they cannot collide within a
//! process lifetime.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a spawned listener.
///
/// Formatted as `listener_NNNNNN` with a zero-padded six-digit serial.
/// Generated once at creation time and immutable thereafter. Used as the
/// map key in [`super::ListenerRegistry`] and carried in every envelope
/// payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(String);

impl ListenerId {
    /// Creates a `ListenerId` from a factory-allocated serial number.
    #[must_use]
    pub fn from_serial(serial: u64) -> Self {
        Self(format!("listener_{serial:06}"))
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn from_serial_zero_pads_to_six_digits() {
        assert_eq!(ListenerId::from_serial(1).as_str(), "listener_000001");
        assert_eq!(ListenerId::from_serial(42).as_str(), "listener_000042");
        assert_eq!(ListenerId::from_serial(999_999).as_str(), "listener_999999");
    }

    #[test]
    fn serials_beyond_six_digits_widen() {
        assert_eq!(ListenerId::from_serial(1_000_000).as_str(), "listener_1000000");
    }

    #[test]
    fn ordering_follows_serial_within_fixed_width() {
        let a = ListenerId::from_serial(3);
        let b = ListenerId::from_serial(12);
        assert!(a < b);
    }

    #[test]
    fn serde_is_transparent() {
        let id = ListenerId::from_serial(7);
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"listener_000007\""));
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let id = ListenerId::from_serial(5);
        let mut map = HashMap::new();
        map.insert(id.clone(), "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }
}
