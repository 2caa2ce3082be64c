use std::path::PathBuf;

use crate::Hash;

/// error type for twig operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("repository not found at {0}")]
    NoRepo(PathBuf),

    #[error("repository already exists at {0}")]
    RepoExists(PathBuf),

    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("no commit with that id exists: {0}")]
    CommitNotFound(String),

    #[error("path not found in commit: {0}")]
    PathNotFound(String),

    #[error("a branch named {0} already exists")]
    DuplicateBranch(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("cannot delete the current branch: {0}")]
    CurrentBranch(String),

    #[error("no changes added to the commit")]
    EmptyCommit,

    #[error("commit message is empty")]
    EmptyMessage,

    #[error("path is neither staged nor tracked: {0}")]
    NotTracked(String),

    #[error("you have uncommitted changes")]
    UncommittedChanges,

    #[error("cannot merge a branch with itself: {0}")]
    SelfMerge(String),

    #[error("given branch is an ancestor of the current branch: {0}")]
    AlreadyUpToDate(String),

    #[error("untracked working file would be overwritten: {}", .0.join(", "))]
    UntrackedFileConflict(Vec<String>),

    #[error("commits {0} and {1} share no history")]
    NoCommonAncestor(Hash, Hash),

    #[error("ambiguous object id prefix: {0}")]
    AmbiguousId(String),

    #[error("object {hash} is a {actual}, expected a {expected}")]
    ObjectKindMismatch {
        hash: Hash,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("corrupt object: hash mismatch for {0}")]
    CorruptObject(Hash),

    #[error("corrupt object: {0}")]
    CorruptObjectMessage(String),

    #[error("invalid tree entry name: {0}")]
    InvalidEntryName(String),

    #[error("duplicate tree entry name: {0}")]
    DuplicateEntryName(String),

    #[error("invalid working path: {0}")]
    InvalidPath(String),

    #[error("lock contention on repository")]
    LockContention,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cbor serialization error: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("cbor deserialization error: {0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),
}

impl Error {
    /// true for every "referenced thing does not exist" failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ObjectNotFound(_)
                | Error::BranchNotFound(_)
                | Error::CommitNotFound(_)
                | Error::PathNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
