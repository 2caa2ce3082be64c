use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::object::resolve_commit_prefix;
use crate::repo::Repo;
use crate::types::Head;

/// write a branch (create or update)
///
/// branch names may contain slashes for grouping, like "feature/login"
pub fn write_branch(repo: &Repo, name: &str, hash: &Hash) -> Result<()> {
    validate_branch_name(name)?;
    let path = branch_path(repo, name);
    repo.write_atomic(&path, format!("{}\n", hash.to_hex()).as_bytes())
}

/// read a branch
pub fn read_branch(repo: &Repo, name: &str) -> Result<Hash> {
    let path = branch_path(repo, name);

    let content = fs::read_to_string(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::BranchNotFound(name.to_string())
        } else {
            Error::Io {
                path: path.clone(),
                source: e,
            }
        }
    })?;

    Hash::from_hex(content.trim())
}

/// delete a branch
pub fn delete_branch(repo: &Repo, name: &str) -> Result<()> {
    let path = branch_path(repo, name);

    fs::remove_file(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::BranchNotFound(name.to_string())
        } else {
            Error::Io { path, source: e }
        }
    })
}

/// check if a branch exists
pub fn branch_exists(repo: &Repo, name: &str) -> bool {
    validate_branch_name(name).is_ok() && branch_path(repo, name).is_file()
}

/// list all branches
pub fn list_branches(repo: &Repo) -> Result<Vec<String>> {
    let refs_dir = repo.refs_path();
    let mut branches = Vec::new();

    if refs_dir.exists() {
        collect_branches(&refs_dir, &refs_dir, &mut branches)?;
    }

    branches.sort();
    Ok(branches)
}

/// list branches matching a glob pattern
pub fn list_branches_matching(repo: &Repo, pattern: &str) -> Result<Vec<String>> {
    let all = list_branches(repo)?;
    let glob = glob::Pattern::new(pattern).map_err(|e| Error::InvalidBranchName(e.to_string()))?;

    Ok(all.into_iter().filter(|b| glob.matches(b)).collect())
}

/// write HEAD
pub fn write_head(repo: &Repo, head: &Head) -> Result<()> {
    repo.write_atomic(&repo.head_path(), format!("{}\n", head.encode()).as_bytes())
}

/// read HEAD
pub fn read_head(repo: &Repo) -> Result<Head> {
    let path = repo.head_path();
    let content = fs::read_to_string(&path).with_path(&path)?;
    Head::decode(&content)
}

/// commit HEAD resolves to
pub fn resolve_head(repo: &Repo) -> Result<Hash> {
    match read_head(repo)? {
        Head::Attached(name) => read_branch(repo, &name),
        Head::Detached(hash) => Ok(hash),
    }
}

/// move whatever HEAD points at: the attached branch, or HEAD itself when detached
pub fn advance_head(repo: &Repo, hash: &Hash) -> Result<Head> {
    let head = read_head(repo)?;
    match &head {
        Head::Attached(name) => write_branch(repo, name, hash)?,
        Head::Detached(_) => write_head(repo, &Head::Detached(*hash))?,
    }
    Ok(match head {
        Head::Attached(name) => Head::Attached(name),
        Head::Detached(_) => Head::Detached(*hash),
    })
}

/// resolve a branch name or (abbreviated) commit id to a commit
///
/// branch names win over id prefixes.
pub fn resolve_commitish(repo: &Repo, rev: &str) -> Result<Hash> {
    if branch_exists(repo, rev) {
        return read_branch(repo, rev);
    }
    resolve_commit_prefix(repo, rev)
}

/// get filesystem path for a branch
fn branch_path(repo: &Repo, name: &str) -> PathBuf {
    repo.refs_path().join(name)
}

/// recursively collect branches from directory
fn collect_branches(base: &Path, dir: &Path, branches: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let path = entry.path();

        if path.is_dir() {
            collect_branches(base, &path, branches)?;
        } else if path.is_file() {
            // compute branch name relative to base
            if let Ok(rel) = path.strip_prefix(base) {
                branches.push(rel.to_string_lossy().to_string());
            }
        }
    }
    Ok(())
}

/// validate branch name
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidBranchName("empty branch name".to_string()));
    }

    if name.starts_with('/') || name.ends_with('/') {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot start or end with '/': {}",
            name
        )));
    }

    if name.contains("//") {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot contain '//': {}",
            name
        )));
    }

    if name.contains('\0') || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot contain null bytes or whitespace: {:?}",
            name
        )));
    }

    // check for path traversal
    for component in name.split('/') {
        if component == "." || component == ".." {
            return Err(Error::InvalidBranchName(format!(
                "branch name cannot contain '.' or '..': {}",
                name
            )));
        }
    }

    Ok(())
}
