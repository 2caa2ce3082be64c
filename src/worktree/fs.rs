use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use super::WorkTree;
use crate::error::{Error, IoResultExt, Result};
use crate::object::validate_path;

/// name of the metadata directory skipped by default
pub const DEFAULT_META_DIR: &str = ".twig";

/// a working tree rooted at a directory on disk
#[derive(Clone, Debug)]
pub struct FsWorkTree {
    root: PathBuf,
    skip: Vec<PathBuf>,
}

impl FsWorkTree {
    /// work tree at `root`, ignoring `root/.twig`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let skip = vec![root.join(DEFAULT_META_DIR)];
        Self { root, skip }
    }

    /// also ignore everything under `path` (e.g. a repository kept elsewhere in the tree)
    pub fn ignoring(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip.push(path.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> Result<PathBuf> {
        validate_path(path)?;
        let full = self.root.join(path);
        if self.is_skipped(&full) {
            return Err(Error::InvalidPath(path.to_string()));
        }
        Ok(full)
    }

    fn is_skipped(&self, path: &Path) -> bool {
        self.skip.iter().any(|s| path.starts_with(s))
    }

    /// remove directories left empty by a delete, stopping at the root
    fn prune_empty_parents(&self, path: &Path) {
        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == self.root || !d.starts_with(&self.root) {
                break;
            }
            // fails (and stops) on the first non-empty directory
            if fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }
}

impl WorkTree for FsWorkTree {
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full = self.full_path(path)?;
        if !full.is_file() {
            return Ok(None);
        }
        match fs::read(&full) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io {
                path: full,
                source: e,
            }),
        }
    }

    fn write_file(&self, path: &str, content: &[u8]) -> Result<()> {
        let full = self.full_path(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).with_path(parent)?;
        }
        fs::write(&full, content).with_path(&full)
    }

    fn delete_file(&self, path: &str) -> Result<()> {
        let full = self.full_path(path)?;
        match fs::remove_file(&full) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(Error::Io {
                    path: full,
                    source: e,
                })
            }
        }
        self.prune_empty_parents(&full);
        Ok(())
    }

    fn list_paths(&self) -> Result<BTreeSet<String>> {
        let mut paths = BTreeSet::new();
        if !self.root.exists() {
            return Ok(paths);
        }

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_skipped(e.path()));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.root).to_path_buf();
                Error::Io {
                    path,
                    source: e.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|_| Error::InvalidPath(entry.path().display().to_string()))?;
            let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
            match parts {
                Some(parts) => {
                    paths.insert(parts.join("/"));
                }
                None => warn!(path = %entry.path().display(), "skipping non-utf8 path"),
            }
        }

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_read_nested() {
        let dir = tempdir().unwrap();
        let wt = FsWorkTree::new(dir.path());

        wt.write_file("a/b/c.txt", b"hello").unwrap();
        assert_eq!(wt.read_file("a/b/c.txt").unwrap(), Some(b"hello".to_vec()));
        assert_eq!(wt.read_file("missing.txt").unwrap(), None);
        // a directory is not a file
        assert_eq!(wt.read_file("a/b").unwrap(), None);
    }

    #[test]
    fn test_list_skips_metadata_dir() {
        let dir = tempdir().unwrap();
        let wt = FsWorkTree::new(dir.path());

        wt.write_file("top.txt", b"1").unwrap();
        wt.write_file("sub/inner.txt", b"2").unwrap();
        fs::create_dir_all(dir.path().join(".twig/objects")).unwrap();
        fs::write(dir.path().join(".twig/HEAD"), b"ref: main").unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let paths: Vec<_> = wt.list_paths().unwrap().into_iter().collect();
        assert_eq!(paths, vec!["sub/inner.txt", "top.txt"]);
    }

    #[test]
    fn test_ignoring_extra_dir() {
        let dir = tempdir().unwrap();
        let wt = FsWorkTree::new(dir.path()).ignoring(dir.path().join("build"));

        wt.write_file("src.txt", b"1").unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("build/out"), b"2").unwrap();

        assert_eq!(wt.list_paths().unwrap().len(), 1);
        assert!(wt.write_file("build/out", b"3").is_err());
    }

    #[test]
    fn test_delete_prunes_empty_dirs() {
        let dir = tempdir().unwrap();
        let wt = FsWorkTree::new(dir.path());

        wt.write_file("a/b/c.txt", b"1").unwrap();
        wt.write_file("a/keep.txt", b"2").unwrap();
        wt.delete_file("a/b/c.txt").unwrap();

        assert!(!dir.path().join("a/b").exists());
        assert!(dir.path().join("a/keep.txt").exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let dir = tempdir().unwrap();
        let wt = FsWorkTree::new(dir.path());

        wt.delete_file("nothing/here.txt").unwrap();
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let dir = tempdir().unwrap();
        let wt = FsWorkTree::new(dir.path().join("inner"));

        assert!(wt.write_file("../outside.txt", b"x").is_err());
        assert!(wt.read_file("/etc/passwd").is_err());
        assert!(wt.write_file(".twig/HEAD", b"x").is_err());
    }
}
