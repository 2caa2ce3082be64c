use crate::error::Result;
use crate::hash::Hash;
use crate::object::{flatten_tree, read_commit, read_tree};
use crate::refs::resolve_commitish;
use crate::repo::Repo;
use crate::types::{ChangeKind, DiffEntry, EntryKind, Tree};

/// file-level changes between two commits (branch names or id prefixes)
pub fn diff(repo: &Repo, from: &str, to: &str) -> Result<Vec<DiffEntry>> {
    let commit1 = resolve_commitish(repo, from)?;
    let commit2 = resolve_commitish(repo, to)?;

    let tree1 = read_commit(repo, &commit1)?.tree;
    let tree2 = read_commit(repo, &commit2)?.tree;

    diff_trees(repo, &tree1, &tree2)
}

/// file-level changes between two trees, sorted by path
///
/// identical subtrees are skipped without being read.
pub fn diff_trees(repo: &Repo, tree1: &Hash, tree2: &Hash) -> Result<Vec<DiffEntry>> {
    let mut changes = Vec::new();
    diff_level(repo, tree1, tree2, "", &mut changes)?;
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(changes)
}

fn diff_level(
    repo: &Repo,
    tree1: &Hash,
    tree2: &Hash,
    prefix: &str,
    changes: &mut Vec<DiffEntry>,
) -> Result<()> {
    if tree1 == tree2 {
        return Ok(());
    }

    let t1 = read_tree(repo, tree1)?;
    let t2 = read_tree(repo, tree2)?;

    for name in all_names(&t1, &t2) {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", prefix, name)
        };

        let e1 = t1.get(name).map(|e| e.kind);
        let e2 = t2.get(name).map(|e| e.kind);

        match (e1, e2) {
            (Some(EntryKind::Directory { hash: h1 }), Some(EntryKind::Directory { hash: h2 })) => {
                diff_level(repo, &h1, &h2, &path, changes)?;
            }
            (Some(EntryKind::File { hash: h1 }), Some(EntryKind::File { hash: h2 })) => {
                if h1 != h2 {
                    changes.push(DiffEntry::new(path, ChangeKind::Modified));
                }
            }
            // file replaced by directory or the other way round
            (Some(old), Some(new)) => {
                report_all(repo, old, &path, ChangeKind::Deleted, changes)?;
                report_all(repo, new, &path, ChangeKind::Added, changes)?;
            }
            (Some(old), None) => report_all(repo, old, &path, ChangeKind::Deleted, changes)?,
            (None, Some(new)) => report_all(repo, new, &path, ChangeKind::Added, changes)?,
            (None, None) => {}
        }
    }

    Ok(())
}

fn all_names<'a>(t1: &'a Tree, t2: &'a Tree) -> Vec<&'a str> {
    let mut names: Vec<&str> = t1
        .entries()
        .iter()
        .map(|e| e.name.as_str())
        .chain(t2.entries().iter().map(|e| e.name.as_str()))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// report every file under an entry with the same change kind
fn report_all(
    repo: &Repo,
    kind: EntryKind,
    path: &str,
    change: ChangeKind,
    changes: &mut Vec<DiffEntry>,
) -> Result<()> {
    match kind {
        EntryKind::File { .. } => changes.push(DiffEntry::new(path, change)),
        EntryKind::Directory { hash } => {
            for file in flatten_tree(repo, &hash)?.into_keys() {
                changes.push(DiffEntry::new(format!("{}/{}", path, file), change.clone()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{add, commit, remove, test_repo};
    use crate::worktree::{MemWorkTree, WorkTree};

    #[test]
    fn test_diff_identical() {
        let (_dir, repo) = test_repo();

        assert!(diff(&repo, "main", "main").unwrap().is_empty());
    }

    #[test]
    fn test_diff_commits() {
        let (_dir, repo) = test_repo();
        let wt = MemWorkTree::new();
        for (path, content) in [("keep.txt", "k"), ("edit.txt", "1"), ("dir/gone.txt", "g")] {
            wt.write_file(path, content.as_bytes()).unwrap();
            add(&repo, &wt, path).unwrap();
        }
        let c1 = commit(&repo, "base").unwrap();

        wt.write_file("edit.txt", b"2").unwrap();
        add(&repo, &wt, "edit.txt").unwrap();
        remove(&repo, &wt, "dir/gone.txt").unwrap();
        wt.write_file("new/deep/file.txt", b"n").unwrap();
        add(&repo, &wt, "new/deep/file.txt").unwrap();
        let c2 = commit(&repo, "changes").unwrap();

        let changes = diff(&repo, &c1.to_hex(), &c2.to_hex()).unwrap();
        assert_eq!(
            changes,
            vec![
                DiffEntry::new("dir/gone.txt", ChangeKind::Deleted),
                DiffEntry::new("edit.txt", ChangeKind::Modified),
                DiffEntry::new("new/deep/file.txt", ChangeKind::Added),
            ]
        );
    }

    #[test]
    fn test_diff_file_becomes_directory() {
        let (_dir, repo) = test_repo();
        let wt = MemWorkTree::new();
        wt.write_file("x", b"file").unwrap();
        add(&repo, &wt, "x").unwrap();
        let c1 = commit(&repo, "file").unwrap();

        remove(&repo, &wt, "x").unwrap();
        wt.write_file("x/inner", b"nested").unwrap();
        add(&repo, &wt, "x/inner").unwrap();
        let c2 = commit(&repo, "dir").unwrap();

        let changes = diff(&repo, &c1.to_hex(), &c2.to_hex()).unwrap();
        assert_eq!(
            changes,
            vec![
                DiffEntry::new("x", ChangeKind::Deleted),
                DiffEntry::new("x/inner", ChangeKind::Added),
            ]
        );
    }
}
