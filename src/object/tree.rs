use crate::error::Result;
use crate::hash::Hash;
use crate::object::store::{get_kind, put};
use crate::repo::Repo;
use crate::types::{ObjectKind, Tree};

/// write a tree to the object store
///
/// trees are serialized as CBOR with entries already in name order, so equal
/// directory contents always produce the same id.
pub fn write_tree(repo: &Repo, tree: &Tree) -> Result<Hash> {
    let mut cbor_bytes = Vec::new();
    ciborium::into_writer(tree, &mut cbor_bytes)?;
    put(repo, ObjectKind::Tree, &cbor_bytes)
}

/// read a tree from the object store
pub fn read_tree(repo: &Repo, hash: &Hash) -> Result<Tree> {
    let cbor_bytes = get_kind(repo, hash, ObjectKind::Tree)?;
    let tree: Tree = ciborium::from_reader(&cbor_bytes[..])?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntryKind, TreeEntry};
    use crate::Error;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("repo");
        let repo = Repo::init(&repo_path).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_write_and_read_tree() {
        let (_dir, repo) = test_repo();

        let entries = vec![
            TreeEntry::new("file.txt", EntryKind::file(Hash::ZERO)),
            TreeEntry::new("subdir", EntryKind::directory(Hash::ZERO)),
        ];
        let tree = Tree::new(entries).unwrap();

        let hash = write_tree(&repo, &tree).unwrap();
        assert_eq!(read_tree(&repo, &hash).unwrap(), tree);
    }

    #[test]
    fn test_tree_order_independence() {
        let (_dir, repo) = test_repo();

        let a = Tree::new(vec![
            TreeEntry::new("b", EntryKind::file(Hash::ZERO)),
            TreeEntry::new("a", EntryKind::file(Hash::ZERO)),
            TreeEntry::new("c", EntryKind::directory(Hash::ZERO)),
        ])
        .unwrap();
        let b = Tree::new(vec![
            TreeEntry::new("c", EntryKind::directory(Hash::ZERO)),
            TreeEntry::new("a", EntryKind::file(Hash::ZERO)),
            TreeEntry::new("b", EntryKind::file(Hash::ZERO)),
        ])
        .unwrap();

        assert_eq!(write_tree(&repo, &a).unwrap(), write_tree(&repo, &b).unwrap());
    }

    #[test]
    fn test_empty_tree() {
        let (_dir, repo) = test_repo();

        let hash = write_tree(&repo, &Tree::empty()).unwrap();
        assert!(read_tree(&repo, &hash).unwrap().is_empty());
    }

    #[test]
    fn test_read_nonexistent_tree() {
        let (_dir, repo) = test_repo();

        let fake_hash =
            Hash::from_hex("1111111111111111111111111111111111111111111111111111111111111111")
                .unwrap();
        let result = read_tree(&repo, &fake_hash);

        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
    }
}
