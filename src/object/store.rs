use std::fs;
use std::path::PathBuf;

use tracing::trace;
use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::{compute_object_hash, is_hex_prefix, Hash};
use crate::repo::Repo;
use crate::types::ObjectKind;

/// shortest prefix accepted when resolving abbreviated ids
pub const MIN_PREFIX_LEN: usize = 4;

/// store an object, returning its id
///
/// objects are kept as zstd-compressed canonical encodings under
/// `objects/<2 hex>/<62 hex>`. the id is computed over the uncompressed
/// canonical encoding, so it does not depend on the compression level.
/// storing content that already exists is a no-op.
pub fn put(repo: &Repo, kind: ObjectKind, payload: &[u8]) -> Result<Hash> {
    let hash = compute_object_hash(kind, payload);
    let path = object_path(repo, &hash);

    // deduplication: if object already exists, we're done
    if path.exists() {
        return Ok(hash);
    }

    let encoded = encode(kind, payload);
    let compressed =
        zstd::encode_all(&encoded[..], repo.config().compression_level).map_err(|e| Error::Io {
            path: PathBuf::from("<zstd>"),
            source: e,
        })?;

    // identical concurrent writers rename identical bytes over each other
    repo.write_atomic(&path, &compressed)?;
    trace!(%hash, %kind, size = payload.len(), "stored object");

    Ok(hash)
}

/// fetch an object's kind and payload
pub fn get(repo: &Repo, hash: &Hash) -> Result<(ObjectKind, Vec<u8>)> {
    let path = object_path(repo, hash);

    let compressed = fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ObjectNotFound(*hash)
        } else {
            Error::Io {
                path: path.clone(),
                source: e,
            }
        }
    })?;

    let encoded = zstd::decode_all(&compressed[..]).map_err(|e| Error::Io {
        path: path.clone(),
        source: e,
    })?;

    let (kind, payload) = decode(&encoded)?;

    // verify hash
    if compute_object_hash(kind, payload) != *hash {
        return Err(Error::CorruptObject(*hash));
    }

    Ok((kind, payload.to_vec()))
}

/// fetch an object, failing if it is not of the expected kind
pub fn get_kind(repo: &Repo, hash: &Hash, expected: ObjectKind) -> Result<Vec<u8>> {
    let (kind, payload) = get(repo, hash)?;
    if kind != expected {
        return Err(Error::ObjectKindMismatch {
            hash: *hash,
            expected: expected.tag(),
            actual: kind.tag(),
        });
    }
    Ok(payload)
}

/// get the filesystem path to an object
pub fn object_path(repo: &Repo, hash: &Hash) -> PathBuf {
    let (dir, file) = hash.to_path_components();
    repo.objects_path().join(dir).join(file)
}

/// check if an object exists in the store
pub fn object_exists(repo: &Repo, hash: &Hash) -> bool {
    object_path(repo, hash).exists()
}

/// every id present in the store, sorted
pub fn list_object_ids(repo: &Repo) -> Result<Vec<Hash>> {
    let objects = repo.objects_path();
    let mut ids = Vec::new();

    for entry in WalkDir::new(&objects).min_depth(2).max_depth(2) {
        let entry = entry.map_err(|e| Error::Io {
            path: objects.clone(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let dir = entry
            .path()
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = entry.file_name().to_string_lossy();

        // skip anything that isn't an object file
        if let Ok(hash) = Hash::from_hex(&format!("{}{}", dir, file)) {
            ids.push(hash);
        }
    }

    ids.sort();
    Ok(ids)
}

/// ids of every stored object of the given kind
pub fn list_objects(repo: &Repo, kind: ObjectKind) -> Result<Vec<Hash>> {
    let mut matching = Vec::new();
    for hash in list_object_ids(repo)? {
        let (actual, _) = get(repo, &hash)?;
        if actual == kind {
            matching.push(hash);
        }
    }
    Ok(matching)
}

/// resolve an abbreviated (or full) commit id
pub fn resolve_commit_prefix(repo: &Repo, prefix: &str) -> Result<Hash> {
    let prefix = prefix.to_ascii_lowercase();
    if prefix.len() < MIN_PREFIX_LEN || !is_hex_prefix(&prefix) {
        return Err(Error::CommitNotFound(prefix));
    }

    if prefix.len() == 64 {
        let hash = Hash::from_hex(&prefix)?;
        return match get(repo, &hash) {
            Ok((ObjectKind::Commit, _)) => Ok(hash),
            Ok(_) | Err(Error::ObjectNotFound(_)) => Err(Error::CommitNotFound(prefix)),
            Err(e) => Err(e),
        };
    }

    let mut found: Option<Hash> = None;
    for hash in list_object_ids(repo)? {
        if !hash.to_hex().starts_with(&prefix) {
            continue;
        }
        let (kind, _) = get(repo, &hash)?;
        if kind != ObjectKind::Commit {
            continue;
        }
        if found.is_some() {
            return Err(Error::AmbiguousId(prefix));
        }
        found = Some(hash);
    }

    found.ok_or(Error::CommitNotFound(prefix))
}

/// canonical encoding: tag | 0 | payload_len (u64 LE) | payload
fn encode(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let tag = kind.tag().as_bytes();
    let mut out = Vec::with_capacity(tag.len() + 9 + payload.len());
    out.extend_from_slice(tag);
    out.push(0);
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

fn decode(encoded: &[u8]) -> Result<(ObjectKind, &[u8])> {
    let sep = encoded
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| Error::CorruptObjectMessage("missing type tag".to_string()))?;

    let tag = std::str::from_utf8(&encoded[..sep])
        .map_err(|_| Error::CorruptObjectMessage("type tag is not utf-8".to_string()))?;
    let kind = ObjectKind::from_tag(tag)
        .ok_or_else(|| Error::CorruptObjectMessage(format!("unknown object type: {}", tag)))?;

    let rest = &encoded[sep + 1..];
    if rest.len() < 8 {
        return Err(Error::CorruptObjectMessage("truncated length".to_string()));
    }
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&rest[..8]);
    let len = u64::from_le_bytes(len_bytes) as usize;

    let payload = &rest[8..];
    if payload.len() != len {
        return Err(Error::CorruptObjectMessage(format!(
            "payload length {} does not match header {}",
            payload.len(),
            len
        )));
    }

    Ok((kind, payload))
}
