use tracing::info;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::refs::{self, branch_exists, read_head, validate_branch_name, write_branch};
use crate::repo::Repo;

/// create a branch at HEAD's commit; HEAD does not move
pub fn create_branch(repo: &Repo, name: &str) -> Result<Hash> {
    validate_branch_name(name)?;
    if branch_exists(repo, name) {
        return Err(Error::DuplicateBranch(name.to_string()));
    }

    let head = repo.head_commit()?;
    write_branch(repo, name, &head)?;

    info!(branch = name, commit = %head, "created branch");
    Ok(head)
}

/// delete a branch other than the one HEAD is attached to
///
/// commits stay in the object store.
pub fn delete_branch(repo: &Repo, name: &str) -> Result<()> {
    if !branch_exists(repo, name) {
        return Err(Error::BranchNotFound(name.to_string()));
    }
    if read_head(repo)?.branch() == Some(name) {
        return Err(Error::CurrentBranch(name.to_string()));
    }

    refs::delete_branch(repo, name)?;
    info!(branch = name, "deleted branch");
    Ok(())
}
