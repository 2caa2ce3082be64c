//! working-directory adapters
//!
//! the engine never touches the user's files directly; checkout, reset,
//! status, staging and merge all go through a [`WorkTree`].

mod fs;
mod memory;

use std::collections::BTreeSet;

use crate::error::Result;

pub use self::fs::FsWorkTree;
pub use self::memory::MemWorkTree;

/// a set of files addressed by slash-separated relative paths
pub trait WorkTree {
    /// file content, or `None` when nothing is there
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// create or overwrite a file, creating parent directories as needed
    fn write_file(&self, path: &str, content: &[u8]) -> Result<()>;

    /// delete a file; deleting a missing file is not an error
    fn delete_file(&self, path: &str) -> Result<()>;

    /// every file path currently present
    fn list_paths(&self) -> Result<BTreeSet<String>>;
}
