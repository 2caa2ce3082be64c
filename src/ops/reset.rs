use tracing::info;

use crate::error::Result;
use crate::hash::Hash;
use crate::index::Index;
use crate::object::commit_files;
use crate::ops::checkout::sync_worktree;
use crate::refs::{advance_head, resolve_commitish};
use crate::repo::Repo;
use crate::worktree::WorkTree;

/// move the current branch (or detached HEAD) to `target` and sync files to it
pub fn reset(repo: &Repo, worktree: &dyn WorkTree, target: &str) -> Result<Hash> {
    let commit = resolve_commitish(repo, target)?;
    let current = repo.head_commit()?;

    let from = commit_files(repo, &current)?;
    let to = commit_files(repo, &commit)?;
    sync_worktree(repo, worktree, &from, &to)?;

    let head = advance_head(repo, &commit)?;
    let mut index = Index::load(repo)?;
    index.clear();
    index.save(repo)?;

    info!(head = %head, from = %current, to = %commit, "reset");
    Ok(commit)
}
