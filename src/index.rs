use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::FileMap;
use crate::repo::Repo;

/// the staging area: pending changes relative to HEAD's tree
///
/// a path is never staged for addition and removal at the same time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    additions: BTreeMap<String, Hash>,
    removals: BTreeSet<String>,
}

impl Index {
    /// load the staging area; a repository that never staged anything has none
    pub fn load(repo: &Repo) -> Result<Self> {
        let path = repo.index_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io { path, source: e }),
        };
        let index: Index = ciborium::from_reader(&bytes[..])?;
        Ok(index)
    }

    /// persist the staging area
    pub fn save(&self, repo: &Repo) -> Result<()> {
        let mut cbor_bytes = Vec::new();
        ciborium::into_writer(self, &mut cbor_bytes)?;
        repo.write_atomic(&repo.index_path(), &cbor_bytes)
    }

    /// stage `path` as `hash`, cancelling any pending removal
    pub fn stage(&mut self, path: impl Into<String>, hash: Hash) {
        let path = path.into();
        self.removals.remove(&path);
        self.additions.insert(path, hash);
    }

    /// drop a pending addition; returns whether one existed
    pub fn unstage(&mut self, path: &str) -> bool {
        self.additions.remove(path).is_some()
    }

    /// stage the removal of `path`, cancelling any pending addition
    pub fn mark_removed(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.additions.remove(&path);
        self.removals.insert(path);
    }

    /// drop a pending removal; returns whether one existed
    pub fn unmark_removed(&mut self, path: &str) -> bool {
        self.removals.remove(path)
    }

    pub fn clear(&mut self) {
        self.additions.clear();
        self.removals.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub fn additions(&self) -> &BTreeMap<String, Hash> {
        &self.additions
    }

    pub fn removals(&self) -> &BTreeSet<String> {
        &self.removals
    }

    pub fn staged(&self, path: &str) -> Option<&Hash> {
        self.additions.get(path)
    }

    pub fn is_removed(&self, path: &str) -> bool {
        self.removals.contains(path)
    }

    /// the snapshot that committing now would record
    pub fn apply(&self, base: &FileMap) -> FileMap {
        let mut files = base.clone();
        for path in &self.removals {
            files.remove(path);
        }
        for (path, hash) in &self.additions {
            files.insert(path.clone(), *hash);
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn hash(byte: u8) -> Hash {
        Hash::from_bytes([byte; 32])
    }

    #[test]
    fn test_missing_index_is_empty() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("repo")).unwrap();

        assert!(Index::load(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_save_load() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("repo")).unwrap();

        let mut index = Index::default();
        index.stage("a.txt", hash(1));
        index.mark_removed("b.txt");
        index.save(&repo).unwrap();

        assert_eq!(Index::load(&repo).unwrap(), index);
    }

    #[test]
    fn test_stage_and_remove_are_exclusive() {
        let mut index = Index::default();

        index.stage("a.txt", hash(1));
        index.mark_removed("a.txt");
        assert!(index.staged("a.txt").is_none());
        assert!(index.is_removed("a.txt"));

        index.stage("a.txt", hash(2));
        assert_eq!(index.staged("a.txt"), Some(&hash(2)));
        assert!(!index.is_removed("a.txt"));
    }

    #[test]
    fn test_unstage() {
        let mut index = Index::default();
        index.stage("a.txt", hash(1));

        assert!(index.unstage("a.txt"));
        assert!(!index.unstage("a.txt"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_apply() {
        let mut base = FileMap::new();
        base.insert("keep".to_string(), hash(1));
        base.insert("gone".to_string(), hash(2));
        base.insert("edit".to_string(), hash(3));

        let mut index = Index::default();
        index.mark_removed("gone");
        index.stage("edit", hash(4));
        index.stage("new", hash(5));

        let result = index.apply(&base);
        assert_eq!(result.len(), 3);
        assert_eq!(result["keep"], hash(1));
        assert_eq!(result["edit"], hash(4));
        assert_eq!(result["new"], hash(5));
    }

    #[test]
    fn test_clear() {
        let mut index = Index::default();
        index.stage("a", hash(1));
        index.mark_removed("b");
        index.clear();
        assert!(index.is_empty());
    }
}
