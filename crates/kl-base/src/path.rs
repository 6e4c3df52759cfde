//! Workspace paths: colon-separated logical cluster names below `root`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{PATH_SEPARATOR, ROOT_WORKSPACE};

/// Identifies one node of the workspace tree, e.g. `root:team:app`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspacePath(String);

impl WorkspacePath {
    pub fn root() -> Self {
        Self(ROOT_WORKSPACE.to_string())
    }

    /// An empty string names the root workspace.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        if path.is_empty() { Self::root() } else { Self(path) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_WORKSPACE
    }

    /// Drops the last segment. The root, and any single-segment path, map to root.
    pub fn parent(&self) -> Self {
        parent_path(&self.0)
    }

    pub fn child(&self, name: &str) -> Self {
        Self(format!("{}{}{}", self.0, PATH_SEPARATOR, name))
    }

    /// Last segment of the path.
    pub fn name(&self) -> &str {
        self.0.rsplit(PATH_SEPARATOR).next().unwrap_or(&self.0)
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.0.matches(PATH_SEPARATOR).count()
    }
}

pub fn parent_path(path: &str) -> WorkspacePath {
    match path.rfind(PATH_SEPARATOR) {
        Some(idx) if idx > 0 => WorkspacePath(path[..idx].to_string()),
        _ => WorkspacePath::root(),
    }
}

impl Default for WorkspacePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for WorkspacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WorkspacePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkspacePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for WorkspacePath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}
