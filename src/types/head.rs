use std::fmt;

use crate::hash::Hash;

/// what HEAD points at
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Head {
    /// follows a branch; moves when the branch moves
    Attached(String),
    /// pinned to a commit
    Detached(Hash),
}

impl Head {
    /// branch name when attached
    pub fn branch(&self) -> Option<&str> {
        match self {
            Head::Attached(name) => Some(name),
            Head::Detached(_) => None,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Head::Detached(_))
    }

    /// serialized form stored in the HEAD file
    pub(crate) fn encode(&self) -> String {
        match self {
            Head::Attached(name) => format!("ref: {}", name),
            Head::Detached(hash) => hash.to_hex(),
        }
    }

    /// parse the HEAD file content
    pub(crate) fn decode(content: &str) -> crate::Result<Self> {
        let content = content.trim();
        match content.strip_prefix("ref: ") {
            Some(name) => Ok(Head::Attached(name.to_string())),
            None => Ok(Head::Detached(Hash::from_hex(content)?)),
        }
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Head::Attached(name) => write!(f, "{}", name),
            Head::Detached(hash) => write!(f, "{}", hash.short()),
        }
    }
}
