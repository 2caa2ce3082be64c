use crate::error::Result;
use crate::hash::Hash;
use crate::object::store::{get_kind, put};
use crate::repo::Repo;
use crate::types::{Commit, ObjectKind};

/// write a commit to the object store
///
/// commits are serialized as CBOR; every field (tree, parents in order,
/// author, timestamp, message) contributes to the id.
pub fn write_commit(repo: &Repo, commit: &Commit) -> Result<Hash> {
    let mut cbor_bytes = Vec::new();
    ciborium::into_writer(commit, &mut cbor_bytes)?;
    put(repo, ObjectKind::Commit, &cbor_bytes)
}

/// read a commit from the object store
pub fn read_commit(repo: &Repo, hash: &Hash) -> Result<Commit> {
    let cbor_bytes = get_kind(repo, hash, ObjectKind::Commit)?;
    let commit: Commit = ciborium::from_reader(&cbor_bytes[..])?;
    Ok(commit)
}
