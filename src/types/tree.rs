use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Hash;

/// a directory tree - collection of entries sorted by name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// create a new tree, validating and sorting entries
    pub fn new(mut entries: Vec<TreeEntry>) -> Result<Self> {
        // validate entry names
        for entry in &entries {
            validate_entry_name(&entry.name)?;
        }

        // sort by name (byte-wise)
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

        // check for duplicates
        for window in entries.windows(2) {
            if window[0].name == window[1].name {
                return Err(Error::DuplicateEntryName(window[0].name.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// create an empty tree
    pub fn empty() -> Self {
        Self { entries: vec![] }
    }

    /// get entries slice
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// look up entry by name
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_bytes().cmp(name.as_bytes()))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is tree empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// validate an entry name
pub(crate) fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidEntryName("empty name".to_string()));
    }
    if name.contains('/') {
        return Err(Error::InvalidEntryName(format!(
            "name contains '/': {}",
            name
        )));
    }
    if name.contains('\0') {
        return Err(Error::InvalidEntryName(format!(
            "name contains null byte: {}",
            name
        )));
    }
    if name == "." || name == ".." {
        return Err(Error::InvalidEntryName(format!("reserved name: {}", name)));
    }
    Ok(())
}

/// a single entry in a tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// kind of tree entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    /// file content, points at a blob
    File { hash: Hash },

    /// subdirectory, points at another tree
    Directory { hash: Hash },
}

impl EntryKind {
    pub fn file(hash: Hash) -> Self {
        Self::File { hash }
    }

    pub fn directory(hash: Hash) -> Self {
        Self::Directory { hash }
    }

    /// id of the referenced object
    pub fn hash(&self) -> &Hash {
        match self {
            EntryKind::File { hash } | EntryKind::Directory { hash } => hash,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, EntryKind::Directory { .. })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            EntryKind::File { .. } => "file",
            EntryKind::Directory { .. } => "directory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_empty() {
        let t = Tree::empty();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn test_tree_sorting() {
        let entries = vec![
            TreeEntry::new("zebra", EntryKind::file(Hash::ZERO)),
            TreeEntry::new("alpha", EntryKind::file(Hash::ZERO)),
            TreeEntry::new("Beta", EntryKind::directory(Hash::ZERO)),
        ];
        let tree = Tree::new(entries).unwrap();
        let names: Vec<_> = tree.entries().iter().map(|e| e.name.as_str()).collect();
        // byte-wise: uppercase sorts before lowercase
        assert_eq!(names, vec!["Beta", "alpha", "zebra"]);
    }

    #[test]
    fn test_tree_get() {
        let entries = vec![
            TreeEntry::new("alpha", EntryKind::file(Hash::ZERO)),
            TreeEntry::new("beta", EntryKind::directory(Hash::ZERO)),
        ];
        let tree = Tree::new(entries).unwrap();

        assert!(tree.get("alpha").is_some());
        assert!(tree.get("beta").unwrap().kind.is_directory());
        assert!(tree.get("gamma").is_none());
    }

    #[test]
    fn test_tree_rejects_bad_names() {
        for name in ["", "foo/bar", "foo\0bar", ".", ".."] {
            let entries = vec![TreeEntry::new(name, EntryKind::file(Hash::ZERO))];
            assert!(
                matches!(Tree::new(entries), Err(Error::InvalidEntryName(_))),
                "accepted {:?}",
                name
            );
        }
    }

    #[test]
    fn test_tree_rejects_duplicates() {
        let entries = vec![
            TreeEntry::new("same", EntryKind::file(Hash::ZERO)),
            TreeEntry::new("same", EntryKind::directory(Hash::ZERO)),
        ];
        assert!(matches!(
            Tree::new(entries),
            Err(Error::DuplicateEntryName(name)) if name == "same"
        ));
    }

    #[test]
    fn test_entry_kind_accessors() {
        let h = Hash::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789")
            .unwrap();
        assert_eq!(EntryKind::file(h).hash(), &h);
        assert_eq!(EntryKind::directory(h).hash(), &h);
        assert_eq!(EntryKind::file(h).type_name(), "file");
        assert_eq!(EntryKind::directory(h).type_name(), "directory");
    }

    #[test]
    fn test_tree_cbor_determinism() {
        // insertion order must not change the serialized bytes
        let entries1 = vec![
            TreeEntry::new("b", EntryKind::file(Hash::ZERO)),
            TreeEntry::new("a", EntryKind::file(Hash::ZERO)),
        ];
        let entries2 = vec![
            TreeEntry::new("a", EntryKind::file(Hash::ZERO)),
            TreeEntry::new("b", EntryKind::file(Hash::ZERO)),
        ];

        let tree1 = Tree::new(entries1).unwrap();
        let tree2 = Tree::new(entries2).unwrap();

        let mut bytes1 = Vec::new();
        let mut bytes2 = Vec::new();
        ciborium::into_writer(&tree1, &mut bytes1).unwrap();
        ciborium::into_writer(&tree2, &mut bytes2).unwrap();

        assert_eq!(bytes1, bytes2);

        let parsed: Tree = ciborium::from_reader(&bytes1[..]).unwrap();
        assert_eq!(parsed, tree1);
    }
}
