// src/hash.rs

//! Content keys for the registry verification cache
//!
//! A key is the SHA-256 of every field that influences a verification
//! outcome. Changing any of them (a renamed package, a moved repository URL)
//! produces a new key, so stale outcomes are never reused.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Separator between hashed fields so ("ab", "c") and ("a", "bc") differ
const FIELD_SEPARATOR: u8 = 0x1f;

/// Hex-encoded SHA-256 over a sequence of string fields
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(String);

impl ContentKey {
    /// Hash the given fields in order
    pub fn of(fields: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update([FIELD_SEPARATOR]);
            }
            hasher.update(field.as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContentKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}
