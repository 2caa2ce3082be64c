use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// a commit object pointing to a tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// root tree hash
    pub tree: Hash,
    /// parent commit hashes (empty for the root, 1 for linear, 2 for merge)
    pub parents: Vec<Hash>,
    /// author identity
    pub author: String,
    /// unix timestamp (seconds since epoch)
    pub timestamp: i64,
    /// commit message
    pub message: String,
}

impl Commit {
    /// create a new commit stamped with the current time
    pub fn new(
        tree: Hash,
        parents: Vec<Hash>,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self::with_timestamp(tree, parents, author, timestamp, message)
    }

    /// create a new commit with explicit timestamp
    pub fn with_timestamp(
        tree: Hash,
        parents: Vec<Hash>,
        author: impl Into<String>,
        timestamp: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            parents,
            author: author.into(),
            timestamp,
            message: message.into(),
        }
    }

    /// is this the root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// is this a merge commit (two parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// first parent, the lineage followed by `log`
    pub fn first_parent(&self) -> Option<&Hash> {
        self.parents.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_new() {
        let c = Commit::new(Hash::ZERO, vec![], "author", "message");
        assert_eq!(c.tree, Hash::ZERO);
        assert!(c.parents.is_empty());
        assert_eq!(c.author, "author");
        assert_eq!(c.message, "message");
        assert!(c.timestamp > 0);
        assert!(c.is_root());
        assert!(!c.is_merge());
        assert!(c.first_parent().is_none());
    }

    #[test]
    fn test_commit_merge() {
        let p1 =
            Hash::from_hex("1111111111111111111111111111111111111111111111111111111111111111")
                .unwrap();
        let p2 =
            Hash::from_hex("2222222222222222222222222222222222222222222222222222222222222222")
                .unwrap();
        let c = Commit::new(Hash::ZERO, vec![p1, p2], "author", "merge");
        assert!(c.is_merge());
        assert_eq!(c.first_parent(), Some(&p1));
    }

    #[test]
    fn test_commit_cbor_roundtrip() {
        let c = Commit::with_timestamp(Hash::ZERO, vec![Hash::ZERO], "author", 1234567890, "message");

        let mut bytes = Vec::new();
        ciborium::into_writer(&c, &mut bytes).unwrap();

        let parsed: Commit = ciborium::from_reader(&bytes[..]).unwrap();
        assert_eq!(c, parsed);
    }

    #[test]
    fn test_commit_parent_order_matters() {
        let p1 =
            Hash::from_hex("1111111111111111111111111111111111111111111111111111111111111111")
                .unwrap();
        let p2 =
            Hash::from_hex("2222222222222222222222222222222222222222222222222222222222222222")
                .unwrap();
        let a = Commit::with_timestamp(Hash::ZERO, vec![p1, p2], "a", 0, "m");
        let b = Commit::with_timestamp(Hash::ZERO, vec![p2, p1], "a", 0, "m");

        let mut bytes_a = Vec::new();
        let mut bytes_b = Vec::new();
        ciborium::into_writer(&a, &mut bytes_a).unwrap();
        ciborium::into_writer(&b, &mut bytes_b).unwrap();
        assert_ne!(bytes_a, bytes_b);
    }
}
