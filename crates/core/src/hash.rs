//! Blake3 hashing utilities for the ledger.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A named alias for a 32-byte(u8) array, used to represent a 256-bit hash.
pub type H256 = [u8; 32];

/// A wrapper type for H256 with Display and Debug formatting.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hash(pub H256);

impl Hash {
    /// Convert to a lowercase hex string (no `0x` prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash(0x{})", &self.to_hex()[..8])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// Hash arbitrary data using Blake3.
pub fn hash(data: &[u8]) -> Hash {
    Hash(blake3::hash(data).into())
}

/// Hash the canonical JSON encoding of a value.
///
/// Object keys are sorted at every nesting level before encoding, so the
/// digest depends only on field names and values, never on declaration or
/// insertion order.
pub fn hash_canonical<T: Serialize + ?Sized>(value: &T) -> Hash {
    hash(&canonical_json(value))
}

/// Encode a value as compact JSON with recursively sorted object keys.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    // Our data types have string keys only, so conversion cannot fail.
    let value = serde_json::to_value(value).expect("serialization should not fail");
    serde_json::to_vec(&canonicalize(value)).expect("serialization should not fail")
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key, canonicalize(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
