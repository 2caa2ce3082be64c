use crate::error::Result;
use crate::graph::first_parent_history;
use crate::hash::Hash;
use crate::object::{list_objects, read_commit};
use crate::repo::Repo;
use crate::types::{Commit, ObjectKind};

/// commit with its hash for log output
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub hash: Hash,
    pub commit: Commit,
}

/// first-parent history from HEAD, newest first
pub fn log(repo: &Repo, max_count: Option<usize>) -> Result<Vec<LogEntry>> {
    log_from(repo, &repo.head_commit()?, max_count)
}

/// first-parent history from `start`, newest first
pub fn log_from(repo: &Repo, start: &Hash, max_count: Option<usize>) -> Result<Vec<LogEntry>> {
    let mut history = first_parent_history(repo, start)?;
    if let Some(max) = max_count {
        history.truncate(max);
    }

    history
        .into_iter()
        .map(|hash| {
            Ok(LogEntry {
                commit: read_commit(repo, &hash)?,
                hash,
            })
        })
        .collect()
}

/// every commit in the store, newest first
pub fn global_log(repo: &Repo) -> Result<Vec<LogEntry>> {
    let mut entries = list_objects(repo, ObjectKind::Commit)?
        .into_iter()
        .map(|hash| {
            Ok(LogEntry {
                commit: read_commit(repo, &hash)?,
                hash,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // ids break timestamp ties so the order is stable
    entries.sort_by(|a, b| {
        b.commit
            .timestamp
            .cmp(&a.commit.timestamp)
            .then_with(|| a.hash.cmp(&b.hash))
    });
    Ok(entries)
}

/// ids of every commit whose message is exactly `message`
pub fn find(repo: &Repo, message: &str) -> Result<Vec<Hash>> {
    Ok(global_log(repo)?
        .into_iter()
        .filter(|entry| entry.commit.message == message)
        .map(|entry| entry.hash)
        .collect())
}
