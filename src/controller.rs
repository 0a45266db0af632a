//! The bookmark controller: public operations over the collection.
//!
//! Consumes user commands and filesystem events, mutates the collection,
//! notifies subscribers, and schedules debounced saves. The collection lives
//! behind a lock so the debounced save worker always serializes the latest
//! in-memory state; refresh passes only ever touch status fields, so a
//! structural edit racing a refresh always wins.

use crate::collection::Collection;
use crate::error::{ModelError, StoreError};
use crate::events::FileEvent;
use crate::item::{FileStatus, Item};
use crate::paths::{self, WorkspaceRoots};
use crate::probe::{LineProbe, ProbeResult};
use crate::schedule::DebouncedTask;
use crate::store::BookmarkStore;
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What a mutation touched, for subscribers that refresh partially.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    All,
    /// Only these keys changed (status reclassification).
    Items(Vec<String>),
}

type Listener = Box<dyn Fn(&Change) + Send + Sync>;

/// Outcome of a toggle at a file position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added(String),
    Removed(String),
}

pub struct Controller {
    collection: Arc<RwLock<Collection>>,
    store: Arc<dyn BookmarkStore>,
    probe: Arc<dyn LineProbe>,
    saver: DebouncedTask,
    listeners: RwLock<Vec<Listener>>,
    refresh_in_flight: AtomicBool,
}

impl Controller {
    pub fn new(
        roots: WorkspaceRoots,
        store: Arc<dyn BookmarkStore>,
        probe: Arc<dyn LineProbe>,
        save_debounce: Duration,
    ) -> Self {
        let collection = Arc::new(RwLock::new(Collection::new(roots)));

        let saver = {
            let collection = Arc::clone(&collection);
            let store = Arc::clone(&store);
            DebouncedTask::new(save_debounce, move || {
                let records = collection.read().to_records();
                if let Err(e) = store.save(&records) {
                    warn!(error = %e, "failed to save bookmarks");
                }
            })
        };

        Self {
            collection,
            store,
            probe,
            saver,
            listeners: RwLock::new(Vec::new()),
            refresh_in_flight: AtomicBool::new(false),
        }
    }

    /// Read access for the view layer, valid between change notifications.
    pub fn read(&self) -> RwLockReadGuard<'_, Collection> {
        self.collection.read()
    }

    /// Subscribe to change notifications, fired after any mutation.
    pub fn subscribe(&self, listener: impl Fn(&Change) + Send + Sync + 'static) {
        self.listeners.write().push(Box::new(listener));
    }

    fn notify(&self, change: &Change) {
        for listener in self.listeners.read().iter() {
            listener(change);
        }
    }

    /// Notify and schedule a debounced save.
    fn changed(&self, change: Change) {
        self.notify(&change);
        self.saver.request();
    }

    // --- persistence ---

    /// Replace the in-memory collection from the store. A missing or
    /// unreadable store yields an empty collection; statuses are stale until
    /// the next refresh pass.
    pub fn load(&self) {
        let records = match self.store.load() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to load bookmark store, starting empty");
                Vec::new()
            }
        };
        let mut collection = self.collection.write();
        collection.load_records(&records);
        info!(count = collection.len(), "loaded bookmarks");
        drop(collection);
        self.notify(&Change::All);
    }

    /// Save immediately, claiming any pending debounced save.
    pub fn save_now(&self) -> Result<(), StoreError> {
        self.saver.cancel();
        let records = self.collection.read().to_records();
        self.store.save(&records)
    }

    /// Run a pending debounced save synchronously, if any. For shutdown and
    /// deterministic tests.
    pub fn flush_pending_save(&self) {
        self.saver.flush();
    }

    pub fn has_pending_save(&self) -> bool {
        self.saver.is_pending()
    }

    // --- user commands ---

    /// Add a bookmark at `file_path`:`line_number`, or remove the existing
    /// one. A new bookmark lands in `parent_folder` when one is given.
    pub fn toggle(
        &self,
        file_path: &Path,
        line_number: u32,
        parent_folder: Option<&str>,
    ) -> ToggleOutcome {
        let file_path = paths::normalize(file_path);
        let outcome = {
            let mut collection = self.collection.write();
            let item = Item::bookmark(collection.roots(), &file_path, line_number, None, None);
            if collection.find(&item) {
                let key = item.key();
                collection.remove_by_key(&key);
                ToggleOutcome::Removed(key)
            } else {
                let item = item.with_parent(parent_folder.map(str::to_string));
                let key = item.key();
                collection.add(item);
                ToggleOutcome::Added(key)
            }
        };
        debug!(outcome = ?outcome, "toggled bookmark");
        self.changed(Change::All);
        outcome
    }

    /// Create a folder. The name must be non-empty after trimming and unique;
    /// a parent folder given here is expanded so the new entry is visible.
    pub fn add_folder(&self, name: &str, parent_folder: Option<&str>) -> Result<(), ModelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::EmptyFolderName);
        }
        {
            let mut collection = self.collection.write();
            if collection.is_folder_name_used(name) {
                return Err(ModelError::DuplicateFolderName(name.to_string()));
            }
            collection.add(Item::folder(name, parent_folder.map(str::to_string), false));
            if let Some(parent) = parent_folder {
                collection.set_expanded(parent, true);
            }
        }
        info!(name = %name, "added folder");
        self.changed(Change::All);
        Ok(())
    }

    /// Relabel a bookmark or rename a folder (children follow).
    pub fn rename(&self, key: &str, new_label: &str) -> Result<(), ModelError> {
        self.collection.write().rename(key, new_label)?;
        self.changed(Change::All);
        Ok(())
    }

    /// Remove an item by key; folders cascade to their descendants.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.collection.write().remove_by_key(key);
        if removed {
            self.changed(Change::All);
        }
        removed
    }

    pub fn clear_all(&self) {
        self.collection.write().clear();
        info!("cleared all bookmarks");
        self.changed(Change::All);
    }

    /// Reorder: put `source_key` immediately before `target_key`.
    pub fn move_before(&self, source_key: &str, target_key: &str) -> bool {
        let moved = {
            let mut collection = self.collection.write();
            let (Some(source), Some(target)) = (
                collection.get(source_key).cloned(),
                collection.get(target_key).cloned(),
            ) else {
                return false;
            };
            collection.move_before(&source, &target)
        };
        if moved {
            self.changed(Change::All);
        }
        moved
    }

    /// Re-link `keys` under `folder` (top level when `None`). Rejects moves
    /// that would introduce a cycle.
    pub fn set_parent(&self, keys: &[String], folder: Option<&str>) -> Result<(), ModelError> {
        self.collection.write().set_parent(keys, folder)?;
        self.changed(Change::All);
        Ok(())
    }

    /// Record a folder's expansion state (UI flag; persisted, no re-render
    /// needed).
    pub fn set_expanded(&self, key: &str, expanded: bool) {
        if self.collection.write().set_expanded(key, expanded) {
            self.saver.request();
        }
    }

    // --- filesystem reconciliation ---

    /// Apply one filesystem event. Removals mark bookmarks missing; renames
    /// re-key bookmarks onto the new path and reclassify it; edits and
    /// creations reclassify the touched path.
    pub async fn on_file_event(&self, event: FileEvent) {
        match event {
            FileEvent::Removed(path) => {
                let path = paths::normalize(&path);
                let changed = self.collection.write().on_file_deleted(&path);
                if !changed.is_empty() {
                    self.changed(Change::Items(changed));
                }
            }
            FileEvent::Renamed { from, to } => {
                let from = paths::normalize(&from);
                let to = paths::normalize(&to);
                self.collection.write().on_file_renamed(&from, &to);
                self.reclassify_path(&to).await;
                self.changed(Change::All);
            }
            FileEvent::Created(path) | FileEvent::Modified(path) => {
                let path = paths::normalize(&path);
                let changed = self.reclassify_path(&path).await;
                if !changed.is_empty() {
                    self.notify(&Change::Items(changed));
                }
            }
        }
    }

    /// Probe `path` and reclassify every bookmark on it. Skips the probe when
    /// no bookmark references the path.
    async fn reclassify_path(&self, path: &Path) -> Vec<String> {
        let referenced = self
            .collection
            .read()
            .items()
            .iter()
            .any(|i| i.file_path() == Some(path));
        if !referenced {
            return Vec::new();
        }

        match self.probe.resolve(path).await {
            ProbeResult::Present { line_count } => {
                self.collection.write().on_file_changed(path, line_count)
            }
            ProbeResult::Missing => self.collection.write().on_file_deleted(path),
        }
    }

    /// Sequential status refresh over all bookmarks, one probe per distinct
    /// file. A refresh requested while one is in flight is skipped; the
    /// running pass completes. Returns the keys whose status changed.
    pub async fn refresh_status(&self) -> Vec<String> {
        if self.refresh_in_flight.swap(true, Ordering::SeqCst) {
            debug!("status refresh already in flight, skipping");
            return Vec::new();
        }

        let targets = self.collection.read().bookmark_targets();
        let mut line_counts: HashMap<PathBuf, ProbeResult> = HashMap::new();
        let mut changed = Vec::new();

        for (key, path, line) in targets {
            let result = match line_counts.get(&path) {
                Some(cached) => *cached,
                None => {
                    let probed = self.probe.resolve(&path).await;
                    line_counts.insert(path.clone(), probed);
                    probed
                }
            };
            let status = match result {
                ProbeResult::Missing => FileStatus::FileNotExist,
                ProbeResult::Present { line_count } if line > line_count => {
                    FileStatus::LineNotExist
                }
                ProbeResult::Present { .. } => FileStatus::LineExist,
            };
            // The bookmark may have been removed while we were probing;
            // set_status is then a no-op.
            if self.collection.write().set_status(&key, status) {
                changed.push(key);
            }
        }

        self.refresh_in_flight.store(false, Ordering::SeqCst);
        if !changed.is_empty() {
            self.notify(&Change::Items(changed.clone()));
        }
        changed
    }
}
