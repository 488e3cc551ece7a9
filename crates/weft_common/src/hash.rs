//! Content hashing for graph fingerprints and snapshot integrity.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// A 128-bit content hash computed with XXH3.
///
/// Two graphs with the same fingerprint are assumed to have identical node,
/// edge and lookup arrays. Snapshots also carry one for their payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Computes a hash over several byte chunks as if they were concatenated,
    /// without materializing the concatenation.
    pub fn from_chunks<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut hasher = Xxh3::new();
        for chunk in chunks {
            hasher.update(chunk);
        }
        Self(hasher.digest128().to_le_bytes())
    }

    /// Returns the raw hash bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"chanx 1 0 track 3");
        let b = ContentHash::from_bytes(b"chanx 1 0 track 3");
        assert_eq!(a, b);
    }

    #[test]
    fn chunks_match_concatenation() {
        let whole = ContentHash::from_bytes(b"nodesedges");
        let parts = ContentHash::from_chunks([b"nodes".as_slice(), b"edges".as_slice()]);
        assert_eq!(whole, parts);
    }

    #[test]
    fn different_inputs_differ() {
        let a = ContentHash::from_bytes(b"wilton");
        let b = ContentHash::from_bytes(b"subset");
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_hex() {
        let s = ContentHash::from_bytes(b"graph").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn serde_json_preserves_value() {
        let h = ContentHash::from_bytes(b"snapshot");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
