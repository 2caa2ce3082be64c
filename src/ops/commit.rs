use tracing::info;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::Index;
use crate::object::{build_tree, commit_files, write_commit, FileMap};
use crate::refs::advance_head;
use crate::repo::Repo;
use crate::types::Commit;

/// commit the staging area on top of HEAD
///
/// advances the attached branch, or HEAD itself when detached, then clears
/// the staging area.
pub fn commit(repo: &Repo, message: &str) -> Result<Hash> {
    if message.trim().is_empty() {
        return Err(Error::EmptyMessage);
    }

    let mut index = Index::load(repo)?;
    let parent = repo.head_commit()?;
    let parent_files = commit_files(repo, &parent)?;

    let files = index.apply(&parent_files);
    if files == parent_files {
        return Err(Error::EmptyCommit);
    }

    let hash = record_commit(repo, &files, vec![parent], message)?;
    let head = advance_head(repo, &hash)?;

    index.clear();
    index.save(repo)?;

    info!(commit = %hash, head = %head, files = files.len(), "committed");
    Ok(hash)
}

/// write the trees and the commit object for a snapshot
///
/// moves no pointer, so a failure afterwards leaves only unreachable objects.
pub(crate) fn record_commit(
    repo: &Repo,
    files: &FileMap,
    parents: Vec<Hash>,
    message: &str,
) -> Result<Hash> {
    let tree = build_tree(repo, files)?;
    let commit = Commit::new(tree, parents, repo.config().author.clone(), message);
    write_commit(repo, &commit)
}
