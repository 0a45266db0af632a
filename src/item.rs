//! Bookmark and folder items.
//!
//! An [`Item`] is either a line bookmark or a folder. Identity (the `key`) and
//! the display strings are derived from the identity-relevant fields at
//! construction; updates go through `with_*` methods that return a new
//! value-equivalent item, so derived state can never go stale.

use crate::paths::{self, WorkspaceRoots};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Whether a bookmark's file and line still exist on disk.
///
/// Transient: recomputed by status refresh passes, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileStatus {
    FileNotExist,
    LineNotExist,
    #[default]
    LineExist,
}

#[derive(Debug, Clone, PartialEq)]
enum ItemKind {
    Bookmark {
        file_path: PathBuf,
        /// Workspace-relative rendering of `file_path`, fixed at construction.
        rel_path: String,
        line_number: u32,
        label: Option<String>,
        status: FileStatus,
    },
    Folder {
        name: String,
        expanded: bool,
    },
}

/// One node of the bookmark collection: a leaf bookmark or a folder.
///
/// The hierarchy is not nested: an item only carries the `key()` of its
/// containing folder (or none for top level), and the collection resolves
/// those links.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    kind: ItemKind,
    parent_folder: Option<String>,
}

impl Item {
    /// Create a bookmark at `file_path`:`line_number` (1-based).
    pub fn bookmark(
        roots: &WorkspaceRoots,
        file_path: impl Into<PathBuf>,
        line_number: u32,
        parent_folder: Option<String>,
        label: Option<String>,
    ) -> Self {
        let file_path = file_path.into();
        let rel_path = roots.relative(&file_path);
        Self {
            kind: ItemKind::Bookmark {
                file_path,
                rel_path,
                line_number,
                label,
                status: FileStatus::default(),
            },
            parent_folder,
        }
    }

    /// Create a folder named `name`.
    pub fn folder(name: impl Into<String>, parent_folder: Option<String>, expanded: bool) -> Self {
        Self {
            kind: ItemKind::Folder {
                name: name.into(),
                expanded,
            },
            parent_folder,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ItemKind::Folder { .. })
    }

    /// A folder is valid iff its name is non-empty; a bookmark iff it has a
    /// path and a positive line number. Invalid items are inert: collections
    /// refuse to match or store them.
    pub fn is_valid(&self) -> bool {
        match &self.kind {
            ItemKind::Folder { name, .. } => !name.is_empty(),
            ItemKind::Bookmark {
                file_path,
                line_number,
                ..
            } => !file_path.as_os_str().is_empty() && *line_number >= 1,
        }
    }

    /// Derived identity: `relative_path:line` for bookmarks, the name for
    /// folders. Two bookmarks on the same file at different lines are
    /// distinct entities.
    pub fn key(&self) -> String {
        match &self.kind {
            ItemKind::Bookmark {
                rel_path,
                line_number,
                ..
            } => format!("{}:{}", rel_path, line_number),
            ItemKind::Folder { name, .. } => name.clone(),
        }
    }

    /// Human-facing label: `basename:line` for bookmarks (prefixed with the
    /// user label when one is set), the name for folders.
    pub fn display_label(&self) -> String {
        match &self.kind {
            ItemKind::Folder { name, .. } => name.clone(),
            ItemKind::Bookmark {
                file_path,
                line_number,
                label,
                ..
            } => {
                let base = format!("{}:{}", paths::base_name(file_path), line_number);
                match label {
                    Some(label) => format!("{} | {}", label, base),
                    None => base,
                }
            }
        }
    }

    /// Secondary display line: the relative path for bookmarks, empty for
    /// folders.
    pub fn description(&self) -> String {
        match &self.kind {
            ItemKind::Folder { .. } => String::new(),
            ItemKind::Bookmark { rel_path, .. } => rel_path.clone(),
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        match &self.kind {
            ItemKind::Bookmark { file_path, .. } => Some(file_path),
            ItemKind::Folder { .. } => None,
        }
    }

    pub fn line_number(&self) -> Option<u32> {
        match &self.kind {
            ItemKind::Bookmark { line_number, .. } => Some(*line_number),
            ItemKind::Folder { .. } => None,
        }
    }

    /// The user label: the free-text annotation for bookmarks, the name for
    /// folders.
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Bookmark { label, .. } => label.as_deref(),
            ItemKind::Folder { name, .. } => Some(name),
        }
    }

    pub fn parent_folder(&self) -> Option<&str> {
        self.parent_folder.as_deref()
    }

    pub fn is_expanded(&self) -> bool {
        match &self.kind {
            ItemKind::Folder { expanded, .. } => *expanded,
            ItemKind::Bookmark { .. } => false,
        }
    }

    pub fn status(&self) -> Option<FileStatus> {
        match &self.kind {
            ItemKind::Bookmark { status, .. } => Some(*status),
            ItemKind::Folder { .. } => None,
        }
    }

    /// New item with the file path (and therefore the key) replaced.
    /// No-op for folders.
    pub fn with_file_path(&self, roots: &WorkspaceRoots, new_path: impl Into<PathBuf>) -> Self {
        match &self.kind {
            ItemKind::Folder { .. } => self.clone(),
            ItemKind::Bookmark {
                line_number,
                label,
                status,
                ..
            } => {
                let file_path = new_path.into();
                let rel_path = roots.relative(&file_path);
                Self {
                    kind: ItemKind::Bookmark {
                        file_path,
                        rel_path,
                        line_number: *line_number,
                        label: label.clone(),
                        status: *status,
                    },
                    parent_folder: self.parent_folder.clone(),
                }
            }
        }
    }

    /// New item with the line number (and therefore the key) replaced.
    /// No-op for folders.
    pub fn with_line_number(&self, line_number: u32) -> Self {
        match &self.kind {
            ItemKind::Folder { .. } => self.clone(),
            ItemKind::Bookmark {
                file_path,
                rel_path,
                label,
                status,
                ..
            } => Self {
                kind: ItemKind::Bookmark {
                    file_path: file_path.clone(),
                    rel_path: rel_path.clone(),
                    line_number,
                    label: label.clone(),
                    status: *status,
                },
                parent_folder: self.parent_folder.clone(),
            },
        }
    }

    /// New item with the label replaced. For a folder this changes the name
    /// and thus the key; the collection re-links children when it applies a
    /// folder rename.
    pub fn with_label(&self, label: Option<String>) -> Self {
        match &self.kind {
            ItemKind::Folder { expanded, .. } => Self {
                kind: ItemKind::Folder {
                    name: label.unwrap_or_default(),
                    expanded: *expanded,
                },
                parent_folder: self.parent_folder.clone(),
            },
            ItemKind::Bookmark {
                file_path,
                rel_path,
                line_number,
                status,
                ..
            } => Self {
                kind: ItemKind::Bookmark {
                    file_path: file_path.clone(),
                    rel_path: rel_path.clone(),
                    line_number: *line_number,
                    label,
                    status: *status,
                },
                parent_folder: self.parent_folder.clone(),
            },
        }
    }

    /// New item re-linked under `parent_folder` (a folder key, or `None` for
    /// top level).
    pub fn with_parent(&self, parent_folder: Option<String>) -> Self {
        Self {
            kind: self.kind.clone(),
            parent_folder,
        }
    }

    /// Expansion is a UI flag, not part of identity; set in place.
    pub fn set_expanded(&mut self, value: bool) {
        if let ItemKind::Folder { expanded, .. } = &mut self.kind {
            *expanded = value;
        }
    }

    /// Status is transient, not part of identity; set in place.
    pub fn set_status(&mut self, value: FileStatus) {
        if let ItemKind::Bookmark { status, .. } = &mut self.kind {
            *status = value;
        }
    }

    /// Total order placing folders before bookmarks; ties compare equal so a
    /// stable sort preserves insertion order between siblings.
    pub fn compare(a: &Item, b: &Item) -> Ordering {
        match (a.is_folder(), b.is_folder()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }

    /// Persisted form of this item.
    pub fn to_record(&self) -> ItemRecord {
        match &self.kind {
            ItemKind::Folder { name, expanded } => ItemRecord {
                is_folder: true,
                label: Some(name.clone()),
                file_path: None,
                line_number: None,
                parent_folder_name: self.parent_folder.clone(),
                is_expanded: Some(*expanded),
            },
            ItemKind::Bookmark {
                file_path,
                line_number,
                label,
                ..
            } => ItemRecord {
                is_folder: false,
                label: label.clone(),
                file_path: Some(file_path.clone()),
                line_number: Some(*line_number),
                parent_folder_name: self.parent_folder.clone(),
                is_expanded: None,
            },
        }
    }

    /// Rebuild an item from its persisted form. Records missing required
    /// fields yield `None` and are skipped by the loader.
    pub fn from_record(roots: &WorkspaceRoots, record: &ItemRecord) -> Option<Self> {
        if record.is_folder {
            let name = record.label.clone()?;
            Some(Item::folder(
                name,
                record.parent_folder_name.clone(),
                record.is_expanded.unwrap_or(false),
            ))
        } else {
            let file_path = record.file_path.clone()?;
            let line_number = record.line_number?;
            Some(Item::bookmark(
                roots,
                file_path,
                line_number,
                record.parent_folder_name.clone(),
                record.label.clone(),
            ))
        }
    }
}

/// Discriminated persisted record for one item. Optional fields tolerate
/// partial data from older store versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub is_folder: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
}
