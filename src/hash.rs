use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::types::ObjectKind;
use crate::Error;

/// SHA-256 hash used for content addressing
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; 32]);

impl Hash {
    /// zero hash (useful as sentinel)
    pub const ZERO: Hash = Hash([0u8; 32]);

    /// create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// parse from hex string
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        let bytes = hex::decode(s).map_err(|_| Error::InvalidHashHex(s.to_string()))?;
        if bytes.len() != 32 {
            return Err(Error::InvalidHashHex(s.to_string()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// get raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// abbreviated hex form used in merge messages and conflict labels
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }

    /// split into path components for object store
    /// returns (first 2 hex chars, remaining 62 hex chars)
    pub fn to_path_components(&self) -> (String, String) {
        let hex = self.to_hex();
        (hex[..2].to_string(), hex[2..].to_string())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &self.to_hex()[..12])
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// is `s` a plausible (possibly abbreviated) lowercase hex id
pub fn is_hex_prefix(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 64
        && s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

/// compute the id of an object from its kind and payload
///
/// format (the canonical encoding):
///   tag: kind name bytes ("blob", "tree", "commit")
///   separator: 1 zero byte
///   payload_len: 8 bytes LE
///   payload: bytes
pub fn compute_object_hash(kind: ObjectKind, payload: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(kind.tag().as_bytes());
    hasher.update([0u8]);
    hasher.update((payload.len() as u64).to_le_bytes());
    hasher.update(payload);
    Hash(hasher.finalize().into())
}

/// hash of a working file as it would be stored as a blob
pub fn compute_blob_hash(content: &[u8]) -> Hash {
    compute_object_hash(ObjectKind::Blob, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_hex_roundtrip() {
        let original =
            Hash::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789")
                .unwrap();
        let hex = original.to_hex();
        let parsed = Hash::from_hex(&hex).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_hash_invalid_hex() {
        assert!(Hash::from_hex("not valid hex").is_err());
        assert!(Hash::from_hex("abcd").is_err()); // too short
        assert!(Hash::from_hex(
            "abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789ff"
        )
        .is_err()); // too long
    }

    #[test]
    fn test_hash_path_components() {
        let h =
            Hash::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789")
                .unwrap();
        let (dir, file) = h.to_path_components();
        assert_eq!(dir, "ab");
        assert_eq!(file, "cdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789");
        assert_eq!(h.short(), "abcdef0");
    }

    #[test]
    fn test_object_hash_determinism() {
        let h1 = compute_object_hash(ObjectKind::Blob, b"hello");
        let h2 = compute_object_hash(ObjectKind::Blob, b"hello");
        assert_eq!(h1, h2);
        assert_eq!(h1, compute_blob_hash(b"hello"));
    }

    #[test]
    fn test_object_hash_kind_discriminates() {
        // same payload, different kind: must not collide
        let blob = compute_object_hash(ObjectKind::Blob, b"payload");
        let tree = compute_object_hash(ObjectKind::Tree, b"payload");
        let commit = compute_object_hash(ObjectKind::Commit, b"payload");
        assert_ne!(blob, tree);
        assert_ne!(blob, commit);
        assert_ne!(tree, commit);
    }

    #[test]
    fn test_object_hash_different_content() {
        let h1 = compute_blob_hash(b"hello");
        let h2 = compute_blob_hash(b"world");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_empty_blob_hash() {
        assert_ne!(compute_blob_hash(b""), Hash::ZERO);
    }

    #[test]
    fn test_hex_prefix_detection() {
        assert!(is_hex_prefix("abc123"));
        assert!(!is_hex_prefix(""));
        assert!(!is_hex_prefix("main"));
        assert!(!is_hex_prefix("ABC"));
    }

    #[test]
    fn test_hash_serde_json() {
        let h =
            Hash::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789")
                .unwrap();
        let json = serde_json::to_string(&h).unwrap();
        assert!(json.contains("abcdef"));
        let parsed: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, parsed);
    }
}
