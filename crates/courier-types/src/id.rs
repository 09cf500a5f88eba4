use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Wire form of an id that was never assigned.
pub const SENTINEL_HEX: &str = "000000000000000000000000";

/// Identifier of a stored entity.
///
/// An `EntityId` is 12 bytes, written on the wire as 24 lowercase hex
/// characters. The all-zero value is reserved as the "unset" sentinel and can
/// never be held by an `EntityId`; an absent id is expressed as
/// `Option<EntityId>::None` instead. Use [`EntityId::parse`] to read wire
/// strings, which maps both `""` and [`SENTINEL_HEX`] to `None`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId([u8; 12]);

impl EntityId {
    /// Generate a fresh id.
    ///
    /// Layout: 4-byte big-endian seconds since the epoch, 5 bytes fixed per
    /// process, 3-byte wrapping counter.
    pub fn generate() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        let count = next_count();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Build an id from raw bytes. Returns `None` for the all-zero sentinel.
    pub fn from_bytes(bytes: [u8; 12]) -> Option<Self> {
        if bytes == [0u8; 12] {
            None
        } else {
            Some(Self(bytes))
        }
    }

    /// Parse a wire string, treating `""` and the sentinel as "not provided".
    pub fn parse(s: &str) -> Result<Option<Self>, TypeError> {
        if s.is_empty() || s == SENTINEL_HEX {
            return Ok(None);
        }
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 12 {
            return Err(TypeError::InvalidLength {
                expected: 12,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 12];
        arr.copy_from_slice(&bytes);
        Ok(Self::from_bytes(arr))
    }

    /// Parse a wire string that must name a concrete id.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        Self::parse(s)?.ok_or(TypeError::UnsetId)
    }

    /// The raw 12 bytes.
    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Hex-encoded string representation (24 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Seconds-since-epoch prefix embedded by [`EntityId::generate`].
    pub fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

fn process_unique() -> &'static [u8; 5] {
    static UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    UNIQUE.get_or_init(|| rand::thread_rng().gen())
}

fn next_count() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER
        .get_or_init(|| AtomicU32::new(rand::thread_rng().gen_range(0..0x00ff_ffff)))
        .fetch_add(1, Ordering::Relaxed)
        & 0x00ff_ffff
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.to_hex())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for EntityId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<EntityId>` fields that accept the sentinel.
///
/// Deserializes `null`, `""` and the sentinel to `None`; serializes `None`
/// as `null` (pair with `skip_serializing_if = "Option::is_none"`).
pub mod optional {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::EntityId;

    pub fn serialize<S: Serializer>(id: &Option<EntityId>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.serialize_str(&id.to_hex()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<EntityId>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(s) => EntityId::parse(&s).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Serde adapter for id lists; unset entries are dropped on read.
pub mod list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::EntityId;

    pub fn serialize<S: Serializer>(ids: &[EntityId], serializer: S) -> Result<S::Ok, S::Error> {
        ids.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<EntityId>, D::Error> {
        let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
        let mut ids = Vec::new();
        for s in raw.unwrap_or_default() {
            if let Some(id) = EntityId::parse(&s).map_err(serde::de::Error::custom)? {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}
