//! Filesystem change events and per-path coalescing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One externally observed filesystem change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
}

impl FileEvent {
    /// The path the event is keyed on; renames key on their destination.
    pub fn path(&self) -> &Path {
        match self {
            FileEvent::Created(p) | FileEvent::Modified(p) | FileEvent::Removed(p) => p,
            FileEvent::Renamed { to, .. } => to,
        }
    }
}

/// Coalesces a burst of events to one per path, last event winning, while the
/// watch loop waits out its batch window. First-seen order is preserved so
/// reconciliation applies events in roughly the order they arrived.
#[derive(Debug, Default)]
pub struct EventBatcher {
    pending: HashMap<PathBuf, FileEvent>,
    order: Vec<PathBuf>,
}

impl EventBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, event: FileEvent) {
        let path = event.path().to_path_buf();
        if self.pending.insert(path.clone(), event).is_none() {
            self.order.push(path);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Drain the batch in first-seen path order.
    pub fn take(&mut self) -> Vec<FileEvent> {
        let mut events = Vec::with_capacity(self.order.len());
        for path in self.order.drain(..) {
            if let Some(event) = self.pending.remove(&path) {
                events.push(event);
            }
        }
        events
    }
}
