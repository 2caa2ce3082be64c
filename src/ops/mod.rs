//! high-level operations on twig repositories
//!
//! operations that read or write user files take a [`WorkTree`](crate::WorkTree).

mod branch;
mod checkout;
mod commit;
mod diff;
mod log;
mod merge;
mod reset;
mod stage;
mod status;

pub use branch::{create_branch, delete_branch};
pub use checkout::{checkout, checkout_file};
pub use commit::commit;
pub use diff::{diff, diff_trees};
pub use log::{find, global_log, log, log_from, LogEntry};
pub use merge::{classify, merge, render_conflict, MergeCase, MergeOutcome};
pub use reset::reset;
pub use stage::{add, remove, stage, unstage};
pub use status::{status, Status};

#[cfg(test)]
pub(crate) fn test_repo() -> (tempfile::TempDir, crate::Repo) {
    let dir = tempfile::tempdir().unwrap();
    let repo = crate::Repo::init(&dir.path().join("repo")).unwrap();
    (dir, repo)
}
