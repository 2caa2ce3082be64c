use crate::error::Result;
use crate::hash::compute_blob_hash;
use crate::index::Index;
use crate::object::commit_files;
use crate::refs::{list_branches, read_head};
use crate::repo::Repo;
use crate::types::{ChangeKind, DiffEntry, Head};
use crate::worktree::WorkTree;

/// snapshot of repository and working tree state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub head: Head,
    pub branches: Vec<String>,
    /// paths staged for addition or modification
    pub staged: Vec<String>,
    /// paths staged for removal
    pub removed: Vec<String>,
    /// tracked or staged paths whose working file differs (modified or deleted)
    pub unstaged: Vec<DiffEntry>,
    /// working files neither tracked nor staged
    pub untracked: Vec<String>,
}

impl Status {
    /// nothing staged and no working file differs from what would be committed
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.removed.is_empty()
            && self.unstaged.is_empty()
            && self.untracked.is_empty()
    }
}

/// compare HEAD, the staging area and the working tree; changes nothing
pub fn status(repo: &Repo, worktree: &dyn WorkTree) -> Result<Status> {
    let head = read_head(repo)?;
    let head_files = commit_files(repo, &repo.head_commit()?)?;
    let index = Index::load(repo)?;
    let expected = index.apply(&head_files);
    let present = worktree.list_paths()?;

    let mut unstaged = Vec::new();
    for (path, blob) in &expected {
        match worktree.read_file(path)? {
            None => unstaged.push(DiffEntry::new(path.clone(), ChangeKind::Deleted)),
            Some(content) if compute_blob_hash(&content) != *blob => {
                unstaged.push(DiffEntry::new(path.clone(), ChangeKind::Modified))
            }
            Some(_) => {}
        }
    }

    // a removed path that reappears in the working tree is untracked again
    let untracked: Vec<String> = present
        .into_iter()
        .filter(|path| !expected.contains_key(path))
        .collect();

    Ok(Status {
        head,
        branches: list_branches(repo)?,
        staged: index.additions().keys().cloned().collect(),
        removed: index.removals().iter().cloned().collect(),
        unstaged,
        untracked,
    })
}
