//! Path helpers: workspace-relative display paths and platform case handling.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The set of workspace root directories bookmark paths are made relative to.
///
/// Passed explicitly to everything that derives identity from a path; there is
/// no process-global workspace state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRoots {
    roots: Vec<PathBuf>,
}

impl WorkspaceRoots {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn empty() -> Self {
        Self { roots: Vec::new() }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Render `path` relative to the first root that contains it; paths outside
    /// every root keep their full form.
    pub fn relative(&self, path: &Path) -> String {
        for root in &self.roots {
            if let Ok(stripped) = path.strip_prefix(root) {
                return stripped.to_string_lossy().into_owned();
            }
        }
        path.to_string_lossy().into_owned()
    }
}

/// Final path component, or the whole path when there is none.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Normalize a path for identity comparison.
///
/// Windows filesystems are case-insensitive, so keys derived there fold case;
/// elsewhere the path is taken as-is. UNC prefixes are simplified first.
#[cfg(windows)]
pub fn normalize(path: &Path) -> PathBuf {
    let simplified = dunce::simplified(path);
    PathBuf::from(simplified.to_string_lossy().to_lowercase())
}

#[cfg(not(windows))]
pub fn normalize(path: &Path) -> PathBuf {
    dunce::simplified(path).to_path_buf()
}
