//! Filesystem watch bridge.
//!
//! Translates raw `notify` events into [`FileEvent`]s, coalesces them per path
//! over a batch window, and feeds them to the controller. This keeps the
//! collection reconciled while an editor (or anything else) touches the
//! workspace.

use crate::controller::Controller;
use crate::error::WatchError;
use crate::events::{EventBatcher, FileEvent};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Watch settings, loaded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Batch window in milliseconds: events arriving within it coalesce.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Path fragments to ignore.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_ignore() -> Vec<String> {
    vec![
        ".git".to_string(),
        "target".to_string(),
        "node_modules".to_string(),
        ".DS_Store".to_string(),
        ".swp".to_string(),
        ".tmp".to_string(),
    ]
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            ignore: default_ignore(),
        }
    }
}

/// Watches workspace roots and drives controller reconciliation.
pub struct WatchService {
    controller: Arc<Controller>,
    settings: WatchSettings,
    running: Arc<AtomicBool>,
}

impl WatchService {
    pub fn new(controller: Arc<Controller>, settings: WatchSettings) -> Self {
        Self {
            controller,
            settings,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle to stop a running watch loop from another task.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Watch `roots` until stopped. Events are batched over the configured
    /// window and applied in arrival order.
    pub async fn run(&self, roots: &[PathBuf]) -> Result<(), WatchError> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            // A send failure means the loop is shutting down.
            let _ = tx.send(res);
        })
        .map_err(WatchError::Create)?;

        for root in roots {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|source| WatchError::Watch {
                    path: root.clone(),
                    source,
                })?;
            info!(root = %root.display(), "watching workspace root");
        }

        self.running.store(true, Ordering::SeqCst);
        let window = Duration::from_millis(self.settings.debounce_ms);
        let mut batcher = EventBatcher::new();

        while self.running.load(Ordering::SeqCst) {
            match tokio::time::timeout(window, rx.recv()).await {
                Ok(Some(Ok(event))) => {
                    if let Some(file_event) = convert_event(event) {
                        if self.is_ignored(file_event.path()) {
                            continue;
                        }
                        batcher.add(file_event);
                    }
                }
                Ok(Some(Err(e))) => {
                    warn!(error = %e, "watch error");
                }
                Ok(None) => {
                    self.running.store(false, Ordering::SeqCst);
                    return Err(WatchError::Disconnected);
                }
                Err(_) => {
                    // Window elapsed quietly: apply the batch.
                    if !batcher.is_empty() {
                        let events = batcher.take();
                        debug!(count = events.len(), "applying batched file events");
                        for event in events {
                            self.controller.on_file_event(event).await;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let haystack = path.to_string_lossy().replace('\\', "/");
        self.settings
            .ignore
            .iter()
            .any(|fragment| haystack.contains(fragment.as_str()))
    }
}

/// Map a raw notify event onto the reconciliation vocabulary. Rename events
/// carrying both endpoints become a rename; single-path name changes are
/// treated as modifications.
fn convert_event(event: Event) -> Option<FileEvent> {
    match event.kind {
        EventKind::Create(_) => event.paths.first().map(|p| FileEvent::Created(p.clone())),
        EventKind::Modify(notify::event::ModifyKind::Name(_)) => {
            if event.paths.len() >= 2 {
                Some(FileEvent::Renamed {
                    from: event.paths[0].clone(),
                    to: event.paths[1].clone(),
                })
            } else {
                event.paths.first().map(|p| FileEvent::Modified(p.clone()))
            }
        }
        EventKind::Modify(_) => event.paths.first().map(|p| FileEvent::Modified(p.clone())),
        EventKind::Remove(_) => event.paths.first().map(|p| FileEvent::Removed(p.clone())),
        _ => None,
    }
}
