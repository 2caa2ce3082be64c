use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use super::WorkTree;
use crate::error::Result;
use crate::object::validate_path;

/// an in-memory working tree
#[derive(Debug, Default)]
pub struct MemWorkTree {
    files: RefCell<BTreeMap<String, Vec<u8>>>,
}

impl MemWorkTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// snapshot of every file
    pub fn files(&self) -> BTreeMap<String, Vec<u8>> {
        self.files.borrow().clone()
    }
}

impl WorkTree for MemWorkTree {
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        validate_path(path)?;
        Ok(self.files.borrow().get(path).cloned())
    }

    fn write_file(&self, path: &str, content: &[u8]) -> Result<()> {
        validate_path(path)?;
        self.files
            .borrow_mut()
            .insert(path.to_string(), content.to_vec());
        Ok(())
    }

    fn delete_file(&self, path: &str) -> Result<()> {
        validate_path(path)?;
        self.files.borrow_mut().remove(path);
        Ok(())
    }

    fn list_paths(&self) -> Result<BTreeSet<String>> {
        Ok(self.files.borrow().keys().cloned().collect())
    }
}
