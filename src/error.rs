//! Error types for the bookmark model and its persistence layer.

use std::path::PathBuf;
use thiserror::Error;

/// Expected, user-facing rejections from collection operations.
///
/// These are not faults: the UI layer turns them into messages. Silent-no-op
/// operations (invalid item shapes, absent keys) never produce an error at all.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("folder name [{0}] already exists")]
    DuplicateFolderName(String),

    #[error("the folder name cannot be empty")]
    EmptyFolderName,

    #[error("cannot move [{src}] into its own descendant [{target}]")]
    CyclicMove { src: String, target: String },

    #[error("no item with key [{0}]")]
    UnknownItem(String),
}

/// Failures touching the persisted bookmark store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read bookmark store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write bookmark store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize bookmark store: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not determine a platform data directory for the store")]
    NoDataDir,
}

/// Failures setting up or running the filesystem watcher.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to create filesystem watcher: {0}")]
    Create(#[source] notify::Error),

    #[error("failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("watcher event channel disconnected")]
    Disconnected,
}
