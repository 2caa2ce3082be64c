use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::hash::{compute_blob_hash, Hash};
use crate::index::Index;
use crate::object::{commit_files, read_blob, resolve_commit_prefix, FileMap};
use crate::refs::{branch_exists, read_branch, read_head, resolve_commitish, write_head};
use crate::repo::Repo;
use crate::types::Head;
use crate::worktree::WorkTree;

/// switch HEAD to a branch (attached) or a commit id or prefix (detached)
///
/// tracked files are rewritten to match the target and the staging area is
/// cleared. checking out the branch HEAD is already on changes nothing.
pub fn checkout(repo: &Repo, worktree: &dyn WorkTree, target: &str) -> Result<Head> {
    let current_head = read_head(repo)?;
    if current_head.branch() == Some(target) {
        debug!(branch = target, "already on branch");
        return Ok(current_head);
    }

    let (head, commit) = if branch_exists(repo, target) {
        (Head::Attached(target.to_string()), read_branch(repo, target)?)
    } else {
        let hash = resolve_commit_prefix(repo, target)?;
        (Head::Detached(hash), hash)
    };

    let current = repo.head_commit()?;
    let from = commit_files(repo, &current)?;
    let to = commit_files(repo, &commit)?;
    sync_worktree(repo, worktree, &from, &to)?;

    write_head(repo, &head)?;
    let mut index = Index::load(repo)?;
    index.clear();
    index.save(repo)?;

    info!(head = %head, commit = %commit, "checked out");
    Ok(head)
}

/// restore one file from a commit (HEAD when `source` is `None`)
///
/// HEAD and the staging area are left alone.
pub fn checkout_file(
    repo: &Repo,
    worktree: &dyn WorkTree,
    path: &str,
    source: Option<&str>,
) -> Result<Hash> {
    let commit = match source {
        Some(rev) => resolve_commitish(repo, rev)?,
        None => repo.head_commit()?,
    };

    let files = commit_files(repo, &commit)?;
    let blob = files
        .get(path)
        .ok_or_else(|| Error::PathNotFound(path.to_string()))?;

    worktree.write_file(path, &read_blob(repo, blob)?)?;
    debug!(path, commit = %commit, "restored file");
    Ok(*blob)
}

/// untracked working files that moving from `from` to `to` would clobber
///
/// a working file is in the way when `to` has a file at the same path, when
/// `to` needs it to be a directory (`a` against `a/b`), or when `to` has a
/// file where it sits inside a directory (`a/b` against `a`).
pub(crate) fn untracked_in_the_way(
    worktree: &dyn WorkTree,
    from: &FileMap,
    to: &FileMap,
) -> Result<Vec<String>> {
    let present = worktree.list_paths()?;
    Ok(present
        .into_iter()
        .filter(|path| !from.contains_key(path))
        .filter(|path| {
            to.contains_key(path) || has_file_below(to, path) || has_file_above(to, path)
        })
        .collect())
}

/// does `files` hold anything under directory `dir`
pub(crate) fn has_file_below(files: &FileMap, dir: &str) -> bool {
    let prefix = format!("{}/", dir);
    files
        .range(prefix.clone()..)
        .next()
        .is_some_and(|(path, _)| path.starts_with(&prefix))
}

/// does `files` hold a file at one of the parent directories of `path`
fn has_file_above(files: &FileMap, path: &str) -> bool {
    path.match_indices('/')
        .any(|(i, _)| files.contains_key(&path[..i]))
}

/// move the working tree from snapshot `from` to snapshot `to`
///
/// fails with `UntrackedFileConflict` before touching any file when an
/// untracked working file is in the way of `to`.
pub(crate) fn sync_worktree(
    repo: &Repo,
    worktree: &dyn WorkTree,
    from: &FileMap,
    to: &FileMap,
) -> Result<()> {
    let conflicts = untracked_in_the_way(worktree, from, to)?;
    if !conflicts.is_empty() {
        return Err(Error::UntrackedFileConflict(conflicts));
    }

    // deletions first, so a file "a" can give way to a directory "a/"
    for path in from.keys().filter(|p| !to.contains_key(*p)) {
        worktree.delete_file(path)?;
    }

    let mut written = 0usize;
    for (path, blob) in to {
        let current = worktree.read_file(path)?;
        if current.as_deref().map(compute_blob_hash).as_ref() == Some(blob) {
            continue;
        }
        worktree.write_file(path, &read_blob(repo, blob)?)?;
        written += 1;
    }

    debug!(written, "synced working tree");
    Ok(())
}
