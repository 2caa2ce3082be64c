//! twig - a local version-control engine
//!
//! content-addressed objects, branches and HEAD, a staging area, and a
//! three-way merge that records conflicts in file content instead of aborting.
//!
//! # Core concepts
//!
//! - **Blob**: file content, stored compressed with zstd
//! - **Tree**: a directory snapshot, names sorted byte-wise (CBOR)
//! - **Commit**: a tree plus parents, author, timestamp and message (CBOR)
//! - **Branch**: a named pointer to a commit under `refs/heads/`
//! - **HEAD**: attached to a branch, or detached at a commit
//!
//! # Hash format
//!
//! id = SHA256(tag | 0x00 | payload_len as u64 LE | payload)
//!
//! where tag is `blob`, `tree` or `commit`, so equal payloads of different
//! kinds never share an id.
//!
//! # Example usage
//!
//! ```no_run
//! use twig::{ops, FsWorkTree, Repo};
//! use std::path::Path;
//!
//! let repo = Repo::init(Path::new("/work/.twig")).unwrap();
//! let wt = FsWorkTree::new("/work");
//!
//! ops::add(&repo, &wt, "README").unwrap();
//! ops::commit(&repo, "add readme").unwrap();
//!
//! ops::create_branch(&repo, "topic").unwrap();
//! let outcome = ops::merge(&repo, &wt, "topic");
//! ```

mod config;
mod error;
mod hash;
mod index;
mod object;
mod refs;
mod repo;

pub mod graph;
pub mod ops;
pub mod types;
pub mod worktree;

pub use config::Config;
pub use error::{Error, Result};
pub use hash::{compute_blob_hash, compute_object_hash, Hash};
pub use index::Index;
pub use object::{
    build_tree, commit_files, flatten_tree, get, list_objects, object_exists, put, read_blob,
    read_commit, read_tree, resolve_commit_prefix, write_blob, write_commit, write_tree, FileMap,
    MIN_PREFIX_LEN,
};
pub use refs::{
    branch_exists, list_branches, list_branches_matching, read_branch, read_head, resolve_commitish,
    resolve_head,
};
pub use repo::{Repo, RepoLock, ROOT_COMMIT_MESSAGE};
pub use types::{ChangeKind, Commit, DiffEntry, EntryKind, Head, ObjectKind, Tree, TreeEntry};
pub use worktree::{FsWorkTree, MemWorkTree, WorkTree};
