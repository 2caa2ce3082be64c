use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};

/// repository configuration stored in config.toml
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// branch HEAD is attached to after init
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// author recorded on new commits
    #[serde(default = "default_author")]
    pub author: String,
    /// zstd level for stored objects
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_author() -> String {
    "twig".to_string()
}

fn default_compression_level() -> i32 {
    3
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)?;
        Ok(())
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_default_branch(mut self, name: impl Into<String>) -> Self {
        self.default_branch = name.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            author: default_author(),
            compression_level: default_compression_level(),
        }
    }
}
