//! Persisted bookmark storage.
//!
//! The whole collection round-trips as one ordered JSON document. Storage is a
//! port so the controller can be driven against an in-memory store in tests.

use crate::error::StoreError;
use crate::item::ItemRecord;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Bumped when the document layout changes; older documents still load as
/// long as their records deserialize.
const STORE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    saved_at: String,
    bookmarks: Vec<ItemRecord>,
}

/// Storage port for the persisted item list.
pub trait BookmarkStore: Send + Sync {
    /// Load all persisted records. A store that does not exist yet, or whose
    /// contents are malformed, yields an empty list — never an error.
    fn load(&self) -> Result<Vec<ItemRecord>, StoreError>;

    /// Persist the full ordered record list, replacing previous contents.
    fn save(&self, records: &[ItemRecord]) -> Result<(), StoreError>;
}

/// JSON file store, one document per workspace.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform data directory default: `<data_dir>/linemark/bookmarks.json`.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let dirs = directories::ProjectDirs::from("", "linemark", "linemark")
            .ok_or(StoreError::NoDataDir)?;
        Ok(dirs.data_dir().join("bookmarks.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl BookmarkStore for JsonFileStore {
    fn load(&self) -> Result<Vec<ItemRecord>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no bookmark store yet, starting empty");
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        match serde_json::from_str::<StoreDocument>(&content) {
            Ok(doc) => {
                if doc.version != STORE_FORMAT_VERSION {
                    warn!(
                        found = doc.version,
                        expected = STORE_FORMAT_VERSION,
                        "bookmark store format version differs, loading anyway"
                    );
                }
                Ok(doc.bookmarks)
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "bookmark store is malformed, starting empty"
                );
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, records: &[ItemRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let doc = StoreDocument {
            version: STORE_FORMAT_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            bookmarks: records.to_vec(),
        };
        let json = serde_json::to_string_pretty(&doc)?;

        std::fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), count = records.len(), "saved bookmarks");
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions. Counts physical saves so
/// debounce behavior can be asserted without touching a disk.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ItemRecord>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ItemRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<ItemRecord> {
        self.records.lock().clone()
    }
}

impl BookmarkStore for MemoryStore {
    fn load(&self) -> Result<Vec<ItemRecord>, StoreError> {
        Ok(self.records.lock().clone())
    }

    fn save(&self, records: &[ItemRecord]) -> Result<(), StoreError> {
        *self.records.lock() = records.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
