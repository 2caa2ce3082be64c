use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::object::{write_commit, write_tree};
use crate::refs::{write_branch, write_head};
use crate::types::{Commit, Head, Tree};

/// message of the commit every repository starts from
pub const ROOT_COMMIT_MESSAGE: &str = "initial commit";

/// a twig repository (the metadata directory, not the working tree)
pub struct Repo {
    path: PathBuf,
    config: Config,
}

impl Repo {
    /// initialize a new repository at the given path with default config
    pub fn init(path: &Path) -> Result<Self> {
        Self::init_with_config(path, Config::default())
    }

    /// initialize a new repository at the given path
    ///
    /// writes the empty root commit and attaches HEAD to the default branch,
    /// so HEAD always resolves to a commit afterwards.
    pub fn init_with_config(path: &Path, config: Config) -> Result<Self> {
        let config_path = path.join("config.toml");
        if config_path.exists() {
            return Err(Error::RepoExists(path.to_path_buf()));
        }

        // create directory structure
        fs::create_dir_all(path.join("objects")).with_path(path)?;
        fs::create_dir_all(path.join("refs/heads")).with_path(path)?;
        fs::create_dir_all(path.join("tmp")).with_path(path)?;

        config.save(&config_path)?;

        let repo = Self {
            path: path.to_path_buf(),
            config,
        };

        let tree = write_tree(&repo, &Tree::empty())?;
        let root = Commit::with_timestamp(
            tree,
            vec![],
            repo.config.author.clone(),
            0,
            ROOT_COMMIT_MESSAGE,
        );
        let root_hash = write_commit(&repo, &root)?;

        let branch = repo.config.default_branch.clone();
        write_branch(&repo, &branch, &root_hash)?;
        write_head(&repo, &Head::Attached(branch.clone()))?;

        info!(path = %path.display(), branch = %branch, root = %root_hash, "initialized repository");
        Ok(repo)
    }

    /// open an existing repository
    pub fn open(path: &Path) -> Result<Self> {
        let config_path = path.join("config.toml");
        if !config_path.exists() {
            return Err(Error::NoRepo(path.to_path_buf()));
        }

        let config = Config::load(&config_path)?;
        debug!(path = %path.display(), "opened repository");

        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    /// repository root path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// repository configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// mutable access to configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// save configuration changes
    pub fn save_config(&self) -> Result<()> {
        self.config.save(&self.config_path())
    }

    /// path to config.toml
    pub fn config_path(&self) -> PathBuf {
        self.path.join("config.toml")
    }

    /// path to objects directory
    pub fn objects_path(&self) -> PathBuf {
        self.path.join("objects")
    }

    /// path to branch refs directory
    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs/heads")
    }

    /// path to HEAD file
    pub fn head_path(&self) -> PathBuf {
        self.path.join("HEAD")
    }

    /// path to the staging area file
    pub fn index_path(&self) -> PathBuf {
        self.path.join("index")
    }

    /// path to tmp directory (for atomic writes)
    pub fn tmp_path(&self) -> PathBuf {
        self.path.join("tmp")
    }

    /// path to lock file
    pub fn lock_path(&self) -> PathBuf {
        self.path.join(".lock")
    }

    /// atomic write: temp -> fsync -> rename -> fsync parent
    pub(crate) fn write_atomic(&self, dest: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).with_path(parent)?;
        }

        let tmp_path = self.tmp_path().join(uuid::Uuid::new_v4().to_string());
        {
            let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
            tmp_file.write_all(content).with_path(&tmp_path)?;
            tmp_file.sync_all().with_path(&tmp_path)?;
        }

        fs::rename(&tmp_path, dest).with_path(dest)?;

        if let Some(parent) = dest.parent() {
            let dir = File::open(parent).with_path(parent)?;
            dir.sync_all().with_path(parent)?;
        }

        Ok(())
    }

    /// acquire exclusive lock on repository
    /// returns a guard that releases the lock on drop
    pub fn lock(&self) -> Result<RepoLock> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        let flock = Flock::lock(file, FlockArg::LockExclusiveNonblock)
            .map_err(|_| Error::LockContention)?;

        Ok(RepoLock { flock })
    }

    /// try to acquire exclusive lock, returning None if already locked
    pub fn try_lock(&self) -> Result<Option<RepoLock>> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(flock) => Ok(Some(RepoLock { flock })),
            Err((_, nix::errno::Errno::EWOULDBLOCK)) => Ok(None),
            Err(_) => Err(Error::LockContention),
        }
    }

    /// commit HEAD currently resolves to
    pub fn head_commit(&self) -> Result<Hash> {
        crate::refs::resolve_head(self)
    }
}

/// guard that holds repository lock until dropped
pub struct RepoLock {
    #[allow(dead_code)]
    flock: Flock<File>,
}
// lock is released automatically when Flock is dropped

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::read_commit;
    use crate::refs::{read_branch, read_head};
    use tempfile::tempdir;

    #[test]
    fn test_repo_init() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");

        let repo = Repo::init(&repo_path).unwrap();

        // verify structure
        assert!(repo_path.join("objects").is_dir());
        assert!(repo_path.join("refs/heads").is_dir());
        assert!(repo_path.join("tmp").is_dir());
        assert!(repo_path.join("config.toml").is_file());
        assert!(repo_path.join("HEAD").is_file());

        // HEAD attached to default branch, which holds the root commit
        assert_eq!(read_head(&repo).unwrap(), Head::Attached("main".to_string()));
        let root = read_branch(&repo, "main").unwrap();
        let commit = read_commit(&repo, &root).unwrap();
        assert!(commit.is_root());
        assert_eq!(commit.message, ROOT_COMMIT_MESSAGE);
        assert_eq!(commit.timestamp, 0);
        assert_eq!(repo.head_commit().unwrap(), root);
    }

    #[test]
    fn test_root_commit_is_deterministic() {
        let dir = tempdir().unwrap();
        let a = Repo::init(&dir.path().join("a")).unwrap();
        let b = Repo::init(&dir.path().join("b")).unwrap();

        assert_eq!(a.head_commit().unwrap(), b.head_commit().unwrap());
    }

    #[test]
    fn test_repo_init_custom_branch() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");

        let config = Config::default().with_default_branch("trunk");
        let repo = Repo::init_with_config(&repo_path, config).unwrap();

        assert_eq!(read_head(&repo).unwrap(), Head::Attached("trunk".to_string()));
        assert!(read_branch(&repo, "main").is_err());
    }

    #[test]
    fn test_repo_init_already_exists() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");

        Repo::init(&repo_path).unwrap();
        let result = Repo::init(&repo_path);

        assert!(matches!(result, Err(Error::RepoExists(_))));
    }

    #[test]
    fn test_repo_open() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");

        Repo::init(&repo_path).unwrap();
        let repo = Repo::open(&repo_path).unwrap();

        assert_eq!(repo.path(), repo_path);
        assert_eq!(repo.config().default_branch, "main");
    }

    #[test]
    fn test_repo_open_not_found() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("nonexistent");

        let result = Repo::open(&repo_path);
        assert!(matches!(result, Err(Error::NoRepo(_))));
    }

    #[test]
    fn test_repo_paths() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");
        let repo = Repo::init(&repo_path).unwrap();

        assert_eq!(repo.objects_path(), repo_path.join("objects"));
        assert_eq!(repo.refs_path(), repo_path.join("refs/heads"));
        assert_eq!(repo.head_path(), repo_path.join("HEAD"));
        assert_eq!(repo.index_path(), repo_path.join("index"));
        assert_eq!(repo.tmp_path(), repo_path.join("tmp"));
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("repo")).unwrap();

        let dest = repo.path().join("nested/dir/file");
        repo.write_atomic(&dest, b"payload").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"payload");
        assert_eq!(fs::read_dir(repo.tmp_path()).unwrap().count(), 0);
    }

    #[test]
    fn test_repo_lock() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");
        let repo = Repo::init(&repo_path).unwrap();

        // acquire lock
        let lock = repo.lock().unwrap();

        // try to acquire again should fail
        let result = repo.try_lock().unwrap();
        assert!(result.is_none());

        // drop lock
        drop(lock);

        // now should succeed
        let lock2 = repo.try_lock().unwrap();
        assert!(lock2.is_some());
    }

    #[test]
    fn test_config_modification() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");
        let mut repo = Repo::init(&repo_path).unwrap();

        repo.config_mut().author = "Barbara".to_string();
        repo.save_config().unwrap();

        // reopen and verify
        let repo2 = Repo::open(&repo_path).unwrap();
        assert_eq!(repo2.config().author, "Barbara");
    }
}
