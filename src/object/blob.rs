use crate::error::Result;
use crate::hash::Hash;
use crate::object::store::{get_kind, put};
use crate::repo::Repo;
use crate::types::ObjectKind;

/// write file content to the object store
///
/// returns the blob hash, which can be used to reference this blob.
pub fn write_blob(repo: &Repo, content: &[u8]) -> Result<Hash> {
    put(repo, ObjectKind::Blob, content)
}

/// read blob content
pub fn read_blob(repo: &Repo, hash: &Hash) -> Result<Vec<u8>> {
    get_kind(repo, hash, ObjectKind::Blob)
}

/// fail unless `hash` names a blob in the object store
///
/// a missing object gives `ObjectNotFound`, a tree or commit gives
/// `ObjectKindMismatch`.
pub fn ensure_blob(repo: &Repo, hash: &Hash) -> Result<()> {
    get_kind(repo, hash, ObjectKind::Blob).map(|_| ())
}
