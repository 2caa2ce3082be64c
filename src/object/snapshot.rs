//! conversion between flat `path -> blob` maps and nested trees.
//!
//! staging, status and merge all reason about snapshots as flat maps keyed by
//! slash-separated relative paths; the object store keeps them as trees.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{read_commit, read_tree, write_tree};
use crate::repo::Repo;
use crate::types::{validate_entry_name, EntryKind, Tree, TreeEntry};

/// a snapshot as relative path -> blob id
pub type FileMap = BTreeMap<String, Hash>;

/// validate a slash-separated working path
pub fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() || path.starts_with('/') || path.ends_with('/') {
        return Err(Error::InvalidPath(path.to_string()));
    }
    for component in path.split('/') {
        validate_entry_name(component).map_err(|_| Error::InvalidPath(path.to_string()))?;
    }
    Ok(())
}

enum Node {
    File(Hash),
    Dir(BTreeMap<String, Node>),
}

/// write the nested trees for a flat snapshot, returning the root tree id
pub fn build_tree(repo: &Repo, files: &FileMap) -> Result<Hash> {
    let mut root: BTreeMap<String, Node> = BTreeMap::new();

    for (path, hash) in files {
        validate_path(path)?;
        let components: Vec<&str> = path.split('/').collect();
        let (last, dirs) = components
            .split_last()
            .ok_or_else(|| Error::InvalidPath(path.clone()))?;

        let mut level = &mut root;
        for dir in dirs {
            let node = level
                .entry(dir.to_string())
                .or_insert_with(|| Node::Dir(BTreeMap::new()));
            level = match node {
                Node::Dir(children) => children,
                // "a" is a file and "a/b" was also requested
                Node::File(_) => return Err(Error::InvalidPath(path.clone())),
            };
        }

        if level.contains_key(*last) {
            return Err(Error::InvalidPath(path.clone()));
        }
        level.insert(last.to_string(), Node::File(*hash));
    }

    write_level(repo, &root)
}

fn write_level(repo: &Repo, level: &BTreeMap<String, Node>) -> Result<Hash> {
    let mut entries = Vec::with_capacity(level.len());
    for (name, node) in level {
        let kind = match node {
            Node::File(hash) => EntryKind::file(*hash),
            Node::Dir(children) => EntryKind::directory(write_level(repo, children)?),
        };
        entries.push(TreeEntry::new(name.clone(), kind));
    }
    write_tree(repo, &Tree::new(entries)?)
}

/// flatten a tree into path -> blob id
pub fn flatten_tree(repo: &Repo, root: &Hash) -> Result<FileMap> {
    let mut files = FileMap::new();
    let mut pending = vec![(String::new(), *root)];

    while let Some((prefix, hash)) = pending.pop() {
        let tree = read_tree(repo, &hash)?;
        for entry in tree.entries() {
            let path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                format!("{}/{}", prefix, entry.name)
            };
            match entry.kind {
                EntryKind::File { hash } => {
                    files.insert(path, hash);
                }
                EntryKind::Directory { hash } => pending.push((path, hash)),
            }
        }
    }

    Ok(files)
}

/// flat snapshot of a commit's tree
pub fn commit_files(repo: &Repo, commit: &Hash) -> Result<FileMap> {
    let commit = read_commit(repo, commit)?;
    flatten_tree(repo, &commit.tree)
}
