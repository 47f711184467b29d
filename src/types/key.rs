//! Record identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use std::fmt;

/// Stable unique key of a record in a bundle.
///
/// Wraps a UUID and implements `Ord` so keys can be listed deterministically.
/// The nil UUID is reserved and never identifies a persistable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(Uuid);

impl RecordKey {
    /// Create a new RecordKey from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a RecordKey from a UUID string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Generate a fresh random key.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Whether this key can identify a record (i.e. is not the nil UUID).
    pub fn is_usable(&self) -> bool {
        !self.0.is_nil()
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RecordKey {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::str::FromStr for RecordKey {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_key_is_not_usable() {
        assert!(!RecordKey::new(Uuid::nil()).is_usable());
        assert!(RecordKey::new(Uuid::from_u128(7)).is_usable());
    }

    #[test]
    fn test_key_ordering_follows_uuid() {
        let k1 = RecordKey::new(Uuid::from_u128(1));
        let k2 = RecordKey::new(Uuid::from_u128(2));
        assert!(k1 < k2);
    }

    #[test]
    fn test_serializes_as_bare_uuid() {
        let key = RecordKey::new(Uuid::from_u128(1));
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000001\"");

        let back: RecordKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
