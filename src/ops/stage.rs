use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::Index;
use crate::object::{commit_files, ensure_blob, validate_path, write_blob};
use crate::repo::Repo;
use crate::worktree::WorkTree;

/// stage `blob` as the next content of `path`
///
/// `blob` must already be stored as a blob. staging HEAD's own version leaves
/// nothing pending for the path. staging always cancels a pending removal.
pub fn stage(repo: &Repo, path: &str, blob: &Hash) -> Result<()> {
    validate_path(path)?;
    ensure_blob(repo, blob)?;

    let head_files = commit_files(repo, &repo.head_commit()?)?;
    let mut index = Index::load(repo)?;

    if head_files.get(path) == Some(blob) {
        index.unstage(path);
        index.unmark_removed(path);
        debug!(path, "matches HEAD, nothing staged");
    } else {
        index.stage(path, *blob);
        debug!(path, %blob, "staged");
    }

    index.save(repo)
}

/// drop whatever is pending for `path`; returns whether anything was
pub fn unstage(repo: &Repo, path: &str) -> Result<bool> {
    let mut index = Index::load(repo)?;
    let added = index.unstage(path);
    let removed = index.unmark_removed(path);
    if added || removed {
        index.save(repo)?;
    }
    Ok(added || removed)
}

/// store the working file at `path` as a blob and stage it
pub fn add(repo: &Repo, worktree: &dyn WorkTree, path: &str) -> Result<Hash> {
    let content = worktree
        .read_file(path)?
        .ok_or_else(|| Error::PathNotFound(path.to_string()))?;
    let blob = write_blob(repo, &content)?;
    stage(repo, path, &blob)?;
    Ok(blob)
}

/// stop tracking `path`
///
/// a pending addition is dropped. a path tracked by HEAD is staged for
/// removal and its working file deleted.
pub fn remove(repo: &Repo, worktree: &dyn WorkTree, path: &str) -> Result<()> {
    validate_path(path)?;
    let head_files = commit_files(repo, &repo.head_commit()?)?;
    let mut index = Index::load(repo)?;

    let was_staged = index.unstage(path);
    let tracked = head_files.contains_key(path);
    if !was_staged && !tracked {
        return Err(Error::NotTracked(path.to_string()));
    }

    if tracked {
        index.mark_removed(path);
        worktree.delete_file(path)?;
    }

    debug!(path, tracked, "removed");
    index.save(repo)
}
