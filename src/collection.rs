//! The bookmark collection.
//!
//! Owns the full ordered set of [`Item`]s as a flat list; the folder hierarchy
//! is implicit in each item's parent key. The collection is the sole mutator:
//! every structural operation, reconciliation against file events, and the
//! persistence record round-trip lives here.

use crate::error::ModelError;
use crate::item::{FileStatus, Item, ItemRecord};
use crate::paths::WorkspaceRoots;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Ordered collection of bookmarks and folders.
///
/// Insertion order is the persisted order. A key index over the list gives
/// O(1) lookups; it is rebuilt after any structural mutation.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    roots: WorkspaceRoots,
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl Collection {
    pub fn new(roots: WorkspaceRoots) -> Self {
        Self {
            roots,
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn roots(&self) -> &WorkspaceRoots {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, key: &str) -> Option<&Item> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// True iff an item with the same key exists. Invalid items never match.
    pub fn find(&self, item: &Item) -> bool {
        if !item.is_valid() {
            return false;
        }
        self.contains_key(&item.key())
    }

    /// Insert an item. Invalid items are dropped silently. A folder whose name
    /// is already taken is rejected (folder names are unique); a bookmark with
    /// an existing key replaces it, moving to the end of the order.
    ///
    /// Returns whether the collection changed.
    pub fn add(&mut self, item: Item) -> bool {
        if !item.is_valid() {
            debug!("ignoring invalid item");
            return false;
        }

        let key = item.key();
        if item.is_folder() && self.is_folder_name_used(&key) {
            warn!(key = %key, "folder name already in use, not adding");
            return false;
        }
        if self.contains_key(&key) {
            // Last write wins; re-insertion moves the item to the end.
            self.remove_by_key(&key);
        }

        debug!(key = %key, folder = item.is_folder(), "adding item");
        self.items.push(item);
        self.reindex();
        true
    }

    /// Remove an item by key. Removing a folder cascades to every descendant.
    /// Invalid items are ignored.
    pub fn remove(&mut self, item: &Item) -> bool {
        if !item.is_valid() {
            return false;
        }
        self.remove_by_key(&item.key())
    }

    /// Remove by key, cascading through folders of arbitrary depth. Children
    /// are gathered from a stable snapshot before each recursion step, and a
    /// visited set guards against corrupt (cyclic) parent links.
    pub fn remove_by_key(&mut self, key: &str) -> bool {
        let mut visited = HashSet::new();
        let removed = self.remove_cascade(key, &mut visited);
        if removed {
            self.reindex();
            debug!(key = %key, "removed item");
        }
        removed
    }

    fn remove_cascade(&mut self, key: &str, visited: &mut HashSet<String>) -> bool {
        if !visited.insert(key.to_string()) {
            warn!(key = %key, "cycle in parent links during cascade removal");
            return false;
        }

        let Some(pos) = self.items.iter().position(|i| i.key() == key) else {
            return false;
        };
        let item = self.items.remove(pos);

        if item.is_folder() {
            let children: Vec<String> = self
                .items
                .iter()
                .filter(|i| i.parent_folder() == Some(key))
                .map(|i| i.key())
                .collect();
            for child in children {
                self.remove_cascade(&child, visited);
            }
        }
        true
    }

    /// Whether some folder already carries this exact name (case-sensitive).
    pub fn is_folder_name_used(&self, name: &str) -> bool {
        self.items
            .iter()
            .any(|i| i.is_folder() && i.label() == Some(name))
    }

    /// Items directly contained in `folder`, in insertion order. Empty when
    /// `folder` is not a folder. Children are matched on the folder's key,
    /// the single canonical folder identity.
    pub fn direct_children(&self, folder: &Item) -> Vec<&Item> {
        if !folder.is_folder() {
            return Vec::new();
        }
        let key = folder.key();
        self.items
            .iter()
            .filter(|i| i.parent_folder() == Some(key.as_str()))
            .collect()
    }

    /// All descendants of `folder`, pre-order.
    pub fn all_children(&self, folder: &Item) -> Vec<&Item> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        self.collect_children(folder, &mut out, &mut visited);
        out
    }

    fn collect_children<'a>(
        &'a self,
        folder: &Item,
        out: &mut Vec<&'a Item>,
        visited: &mut HashSet<String>,
    ) {
        if !folder.is_folder() || !visited.insert(folder.key()) {
            return;
        }
        for child in self.direct_children(folder) {
            out.push(child);
            if child.is_folder() {
                self.collect_children(child, out, visited);
            }
        }
    }

    /// The folder containing `item`, when its parent link resolves. A dangling
    /// reference yields `None` and the item renders at top level until fixed.
    pub fn get_parent(&self, item: &Item) -> Option<&Item> {
        let parent_key = item.parent_folder()?;
        self.get(parent_key)
    }

    /// Ancestors of `item` from its parent up to the root. A visited set keeps
    /// a corrupt parent-link cycle from looping forever.
    pub fn parent_chain(&self, item: &Item) -> Vec<&Item> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.get_parent(item);
        while let Some(parent) = current {
            if !visited.insert(parent.key()) {
                warn!(key = %parent.key(), "cycle in parent links during ancestry walk");
                break;
            }
            chain.push(parent);
            current = self.get_parent(parent);
        }
        chain
    }

    /// Reposition `source` immediately before `target` in the order. No-op if
    /// either is invalid, absent, or they are the same item.
    pub fn move_before(&mut self, source: &Item, target: &Item) -> bool {
        if !source.is_valid() || !target.is_valid() {
            return false;
        }
        let (Some(&target_idx), Some(&source_idx)) = (
            self.index.get(&target.key()),
            self.index.get(&source.key()),
        ) else {
            return false;
        };
        if target_idx == source_idx {
            return false;
        }

        // Insert at the target's pre-removal index, then delete the original
        // occurrence, compensating for the shift the insertion introduced.
        let moved = self.items[source_idx].clone();
        self.items.insert(target_idx, moved);
        if source_idx > target_idx {
            self.items.remove(source_idx + 1);
        } else {
            self.items.remove(source_idx);
        }
        self.reindex();
        true
    }

    /// Rename an item. For bookmarks this changes only the free-text label
    /// (empty clears it); identity is untouched. For folders the name is the
    /// key, so the new name is validated and every direct child is re-linked.
    pub fn rename(&mut self, key: &str, new_label: &str) -> Result<(), ModelError> {
        let pos = *self
            .index
            .get(key)
            .ok_or_else(|| ModelError::UnknownItem(key.to_string()))?;

        let new_label = new_label.trim();
        if !self.items[pos].is_folder() {
            let label = if new_label.is_empty() {
                None
            } else {
                Some(new_label.to_string())
            };
            self.items[pos] = self.items[pos].with_label(label);
            return Ok(());
        }

        if new_label.is_empty() {
            return Err(ModelError::EmptyFolderName);
        }
        if new_label != key && self.is_folder_name_used(new_label) {
            return Err(ModelError::DuplicateFolderName(new_label.to_string()));
        }

        for item in &mut self.items {
            if item.parent_folder() == Some(key) {
                *item = item.with_parent(Some(new_label.to_string()));
            }
        }
        self.items[pos] = self.items[pos].with_label(Some(new_label.to_string()));
        self.reindex();
        debug!(from = %key, to = %new_label, "renamed folder");
        Ok(())
    }

    /// Re-link `keys` under `folder` (or to top level when `None`). Rejected
    /// when any moved item is the target folder itself or one of its
    /// ancestors; a committed cycle in parent links is never representable.
    pub fn set_parent(&mut self, keys: &[String], folder: Option<&str>) -> Result<(), ModelError> {
        if let Some(folder_key) = folder {
            let target = self
                .get(folder_key)
                .ok_or_else(|| ModelError::UnknownItem(folder_key.to_string()))?;

            let mut forbidden: HashSet<String> = HashSet::new();
            forbidden.insert(target.key());
            for ancestor in self.parent_chain(target) {
                forbidden.insert(ancestor.key());
            }
            if let Some(cyclic) = keys.iter().find(|k| forbidden.contains(*k)) {
                return Err(ModelError::CyclicMove {
                    src: cyclic.clone(),
                    target: folder_key.to_string(),
                });
            }
        }

        for key in keys {
            if let Some(&pos) = self.index.get(key) {
                self.items[pos] = self.items[pos].with_parent(folder.map(str::to_string));
            }
        }
        Ok(())
    }

    /// Items that render at top level: no parent link, or one that no longer
    /// resolves.
    pub fn top_level(&self) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|i| match i.parent_folder() {
                None => true,
                Some(parent) => !self.contains_key(parent),
            })
            .collect()
    }

    /// Render-time sibling query: the children of `parent` (top level when
    /// `None`), folders first, insertion order preserved within each group.
    pub fn view_children(&self, parent: Option<&Item>) -> Vec<&Item> {
        let mut children = match parent {
            None => self.top_level(),
            Some(folder) => self.direct_children(folder),
        };
        children.sort_by(|a, b| Item::compare(a, b));
        children
    }

    // --- reconciliation against external file events ---

    /// Every bookmark on `path` is marked missing. Structure is untouched.
    /// Returns the keys whose status actually changed.
    pub fn on_file_deleted(&mut self, path: &Path) -> Vec<String> {
        let mut changed = Vec::new();
        for item in &mut self.items {
            if item.file_path() == Some(path) && item.status() != Some(FileStatus::FileNotExist) {
                item.set_status(FileStatus::FileNotExist);
                changed.push(item.key());
            }
        }
        changed
    }

    /// Every bookmark on `old_path` moves to `new_path`; keys are re-derived
    /// and the entities keep their slots in the order.
    pub fn on_file_renamed(&mut self, old_path: &Path, new_path: &Path) {
        let roots = self.roots.clone();
        let mut touched = false;
        for item in &mut self.items {
            if item.file_path() == Some(old_path) {
                *item = item.with_file_path(&roots, new_path);
                touched = true;
            }
        }
        if touched {
            self.reindex();
            debug!(from = %old_path.display(), to = %new_path.display(), "bookmarks follow renamed file");
        }
    }

    /// Classify every bookmark on `path` against its current line count.
    /// Returns the keys whose status actually changed.
    pub fn on_file_changed(&mut self, path: &Path, line_count: u32) -> Vec<String> {
        let mut changed = Vec::new();
        for item in &mut self.items {
            if item.file_path() != Some(path) {
                continue;
            }
            let next = match item.line_number() {
                Some(line) if line > line_count => FileStatus::LineNotExist,
                Some(_) => FileStatus::LineExist,
                None => continue,
            };
            if item.status() != Some(next) {
                item.set_status(next);
                changed.push(item.key());
            }
        }
        changed
    }

    /// Snapshot of the probe targets for a status-refresh pass:
    /// `(key, file path, line number)` for every bookmark.
    pub fn bookmark_targets(&self) -> Vec<(String, PathBuf, u32)> {
        self.items
            .iter()
            .filter_map(|i| {
                Some((
                    i.key(),
                    i.file_path()?.to_path_buf(),
                    i.line_number()?,
                ))
            })
            .collect()
    }

    /// Set one bookmark's status; true when it changed. Used by refresh
    /// passes, which only ever touch status, never structure.
    pub fn set_status(&mut self, key: &str, status: FileStatus) -> bool {
        let Some(&pos) = self.index.get(key) else {
            return false;
        };
        if self.items[pos].status() == Some(status) {
            return false;
        }
        self.items[pos].set_status(status);
        true
    }

    /// Set a folder's expansion flag (UI state, persisted).
    pub fn set_expanded(&mut self, key: &str, expanded: bool) -> bool {
        let Some(&pos) = self.index.get(key) else {
            return false;
        };
        self.items[pos].set_expanded(expanded);
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    // --- persistence round-trip ---

    /// Persisted form: the full ordered list, both variants tagged.
    pub fn to_records(&self) -> Vec<ItemRecord> {
        self.items.iter().map(Item::to_record).collect()
    }

    /// Replace the whole collection from persisted records. Records that do
    /// not reconstruct into a valid item are skipped with a warning.
    pub fn load_records(&mut self, records: &[ItemRecord]) {
        self.items.clear();
        for record in records {
            match Item::from_record(&self.roots, record) {
                Some(item) if item.is_valid() => self.items.push(item),
                _ => warn!("skipping malformed bookmark record"),
            }
        }
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, item) in self.items.iter().enumerate() {
            self.index.insert(item.key(), pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn roots() -> WorkspaceRoots {
        WorkspaceRoots::new(vec![PathBuf::from("/work")])
    }

    fn collection() -> Collection {
        Collection::new(roots())
    }

    fn bookmark(c: &Collection, path: &str, line: u32, parent: Option<&str>) -> Item {
        Item::bookmark(c.roots(), path, line, parent.map(str::to_string), None)
    }

    #[test]
    fn find_rejects_invalid_items() {
        let mut c = collection();
        c.add(bookmark(&c, "/work/a.txt", 5, None));
        let invalid = Item::bookmark(c.roots(), "", 5, None, None);
        assert!(!c.find(&invalid));
    }

    #[test]
    fn add_is_idempotent_by_key_and_moves_to_end() {
        let mut c = collection();
        c.add(bookmark(&c, "/work/a.txt", 5, None));
        c.add(bookmark(&c, "/work/b.txt", 1, None));
        let relabeled = Item::bookmark(
            c.roots(),
            "/work/a.txt",
            5,
            None,
            Some("note".to_string()),
        );
        c.add(relabeled);

        assert_eq!(c.len(), 2);
        assert_eq!(c.items()[1].key(), "a.txt:5");
        assert_eq!(c.items()[1].label(), Some("note"));
    }

    #[test]
    fn add_rejects_invalid_silently() {
        let mut c = collection();
        assert!(!c.add(Item::folder("", None, false)));
        assert!(c.is_empty());
    }

    #[test]
    fn add_rejects_duplicate_folder_name() {
        let mut c = collection();
        assert!(c.add(Item::folder("Work", None, false)));
        c.add(bookmark(&c, "/work/a.txt", 1, Some("Work")));
        assert!(!c.add(Item::folder("Work", None, true)));

        // The original folder and its child are untouched.
        assert_eq!(c.len(), 2);
        assert!(!c.get("Work").unwrap().is_expanded());
    }

    #[test]
    fn remove_folder_cascades_through_nesting() {
        let mut c = collection();
        c.add(Item::folder("A", None, false));
        c.add(Item::folder("B", Some("A".to_string()), false));
        c.add(bookmark(&c, "/work/c.txt", 3, Some("B")));

        assert!(c.remove_by_key("A"));
        assert!(c.is_empty());
    }

    #[test]
    fn remove_folder_leaves_unrelated_items() {
        let mut c = collection();
        c.add(Item::folder("A", None, false));
        c.add(bookmark(&c, "/work/in.txt", 1, Some("A")));
        c.add(bookmark(&c, "/work/out.txt", 1, None));

        c.remove_by_key("A");
        assert_eq!(c.len(), 1);
        assert_eq!(c.items()[0].key(), "out.txt:1");
    }

    #[test]
    fn remove_survives_cyclic_parent_links() {
        // Forge a corrupt store: two folders parented to each other.
        let mut c = collection();
        let records = vec![
            Item::folder("A", Some("B".to_string()), false).to_record(),
            Item::folder("B", Some("A".to_string()), false).to_record(),
        ];
        c.load_records(&records);

        assert!(c.remove_by_key("A"));
        assert!(c.is_empty());
    }

    #[test]
    fn folder_name_lookup_is_case_sensitive() {
        let mut c = collection();
        c.add(Item::folder("Work", None, false));
        assert!(c.is_folder_name_used("Work"));
        assert!(!c.is_folder_name_used("work"));
    }

    #[test]
    fn direct_children_match_on_folder_key() {
        let mut c = collection();
        c.add(Item::folder("Work", None, false));
        c.add(bookmark(&c, "/work/a.txt", 5, Some("Work")));
        c.add(bookmark(&c, "/work/b.txt", 5, None));

        let folder = c.get("Work").unwrap().clone();
        let children = c.direct_children(&folder);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].key(), "a.txt:5");

        let not_folder = c.get("b.txt:5").unwrap().clone();
        assert!(c.direct_children(&not_folder).is_empty());
    }

    #[test]
    fn all_children_is_preorder() {
        let mut c = collection();
        c.add(Item::folder("A", None, false));
        c.add(Item::folder("B", Some("A".to_string()), false));
        c.add(bookmark(&c, "/work/under_a.txt", 1, Some("A")));
        c.add(bookmark(&c, "/work/under_b.txt", 1, Some("B")));

        let a = c.get("A").unwrap().clone();
        let keys: Vec<String> = c.all_children(&a).iter().map(|i| i.key()).collect();
        assert_eq!(keys, vec!["B", "under_b.txt:1", "under_a.txt:1"]);
    }

    #[test]
    fn parent_chain_walks_to_root() {
        let mut c = collection();
        c.add(Item::folder("A", None, false));
        c.add(Item::folder("B", Some("A".to_string()), false));
        c.add(bookmark(&c, "/work/c.txt", 1, Some("B")));

        let leaf = c.get("c.txt:1").unwrap().clone();
        let chain: Vec<String> = c.parent_chain(&leaf).iter().map(|i| i.key()).collect();
        assert_eq!(chain, vec!["B", "A"]);
    }

    #[test]
    fn parent_chain_tolerates_dangling_reference() {
        let mut c = collection();
        c.add(bookmark(&c, "/work/a.txt", 1, Some("Ghost")));
        let item = c.get("a.txt:1").unwrap().clone();
        assert!(c.get_parent(&item).is_none());
        assert!(c.parent_chain(&item).is_empty());
    }

    #[test]
    fn dangling_parent_renders_at_top_level() {
        let mut c = collection();
        c.add(Item::folder("Work", None, false));
        c.add(bookmark(&c, "/work/a.txt", 1, Some("Ghost")));
        c.add(bookmark(&c, "/work/b.txt", 1, Some("Work")));

        let top: Vec<String> = c.top_level().iter().map(|i| i.key()).collect();
        assert_eq!(top, vec!["Work", "a.txt:1"]);
    }

    #[test]
    fn view_children_sorts_folders_first_stably() {
        let mut c = collection();
        c.add(bookmark(&c, "/work/a.txt", 1, None));
        c.add(Item::folder("Z", None, false));
        c.add(bookmark(&c, "/work/b.txt", 1, None));
        c.add(Item::folder("A", None, false));

        let keys: Vec<String> = c.view_children(None).iter().map(|i| i.key()).collect();
        assert_eq!(keys, vec!["Z", "A", "a.txt:1", "b.txt:1"]);
    }

    #[test]
    fn move_before_repositions_when_source_after_target() {
        let mut c = collection();
        c.add(bookmark(&c, "/work/a.txt", 1, None));
        c.add(bookmark(&c, "/work/b.txt", 1, None));
        c.add(bookmark(&c, "/work/c.txt", 1, None));

        let source = c.get("c.txt:1").unwrap().clone();
        let target = c.get("a.txt:1").unwrap().clone();
        assert!(c.move_before(&source, &target));

        let keys: Vec<String> = c.items().iter().map(|i| i.key()).collect();
        assert_eq!(keys, vec!["c.txt:1", "a.txt:1", "b.txt:1"]);
    }

    #[test]
    fn move_before_repositions_when_source_before_target() {
        let mut c = collection();
        c.add(bookmark(&c, "/work/a.txt", 1, None));
        c.add(bookmark(&c, "/work/b.txt", 1, None));
        c.add(bookmark(&c, "/work/c.txt", 1, None));

        let source = c.get("a.txt:1").unwrap().clone();
        let target = c.get("c.txt:1").unwrap().clone();
        assert!(c.move_before(&source, &target));

        let keys: Vec<String> = c.items().iter().map(|i| i.key()).collect();
        assert_eq!(keys, vec!["b.txt:1", "a.txt:1", "c.txt:1"]);
    }

    #[test]
    fn move_before_is_identity_on_absent_or_same() {
        let mut c = collection();
        c.add(bookmark(&c, "/work/a.txt", 1, None));
        let present = c.get("a.txt:1").unwrap().clone();
        let absent = bookmark(&c, "/work/ghost.txt", 9, None);

        assert!(!c.move_before(&absent, &present));
        assert!(!c.move_before(&present, &absent));
        assert!(!c.move_before(&present, &present));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn rename_folder_relinks_children() {
        let mut c = collection();
        c.add(Item::folder("Work", None, false));
        c.add(bookmark(&c, "/work/a.txt", 1, Some("Work")));

        c.rename("Work", "Home").unwrap();
        assert!(c.contains_key("Home"));
        assert!(!c.contains_key("Work"));
        assert_eq!(c.get("a.txt:1").unwrap().parent_folder(), Some("Home"));
    }

    #[test]
    fn rename_folder_rejects_empty_and_duplicate() {
        let mut c = collection();
        c.add(Item::folder("Work", None, false));
        c.add(Item::folder("Home", None, false));

        assert!(matches!(
            c.rename("Work", "  "),
            Err(ModelError::EmptyFolderName)
        ));
        assert!(matches!(
            c.rename("Work", "Home"),
            Err(ModelError::DuplicateFolderName(_))
        ));
        // Renaming to its own current name is allowed.
        assert!(c.rename("Work", "Work").is_ok());
    }

    #[test]
    fn rename_bookmark_changes_label_only() {
        let mut c = collection();
        c.add(bookmark(&c, "/work/a.txt", 5, None));
        c.rename("a.txt:5", "note").unwrap();

        let item = c.get("a.txt:5").unwrap();
        assert_eq!(item.label(), Some("note"));

        c.rename("a.txt:5", "").unwrap();
        assert_eq!(c.get("a.txt:5").unwrap().label(), None);
    }

    #[test]
    fn set_parent_moves_items_into_folder() {
        let mut c = collection();
        c.add(Item::folder("Work", None, false));
        c.add(bookmark(&c, "/work/a.txt", 1, None));

        c.set_parent(&["a.txt:1".to_string()], Some("Work")).unwrap();
        assert_eq!(c.get("a.txt:1").unwrap().parent_folder(), Some("Work"));

        c.set_parent(&["a.txt:1".to_string()], None).unwrap();
        assert_eq!(c.get("a.txt:1").unwrap().parent_folder(), None);
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let mut c = collection();
        c.add(Item::folder("A", None, false));
        c.add(Item::folder("B", Some("A".to_string()), false));

        // A into its own descendant B.
        assert!(matches!(
            c.set_parent(&["A".to_string()], Some("B")),
            Err(ModelError::CyclicMove { .. })
        ));
        // A into itself.
        assert!(matches!(
            c.set_parent(&["A".to_string()], Some("A")),
            Err(ModelError::CyclicMove { .. })
        ));
        assert_eq!(c.get("A").unwrap().parent_folder(), None);
    }

    #[test]
    fn file_deleted_marks_all_bookmarks_on_path() {
        let mut c = collection();
        c.add(bookmark(&c, "/work/a.txt", 1, None));
        c.add(bookmark(&c, "/work/a.txt", 9, None));
        c.add(bookmark(&c, "/work/b.txt", 1, None));

        c.on_file_deleted(Path::new("/work/a.txt"));
        assert_eq!(
            c.get("a.txt:1").unwrap().status(),
            Some(FileStatus::FileNotExist)
        );
        assert_eq!(
            c.get("a.txt:9").unwrap().status(),
            Some(FileStatus::FileNotExist)
        );
        assert_eq!(
            c.get("b.txt:1").unwrap().status(),
            Some(FileStatus::LineExist)
        );
    }

    #[test]
    fn file_renamed_rederives_keys_in_place() {
        let mut c = collection();
        c.add(bookmark(&c, "/work/a.txt", 5, None));
        c.add(bookmark(&c, "/work/b.txt", 1, None));

        c.on_file_renamed(Path::new("/work/a.txt"), Path::new("/work/c.txt"));
        assert!(c.contains_key("c.txt:5"));
        assert!(!c.contains_key("a.txt:5"));
        // Same entity, same slot in the order.
        assert_eq!(c.items()[0].key(), "c.txt:5");
    }

    #[test]
    fn file_changed_reclassifies_lines() {
        let mut c = collection();
        c.add(bookmark(&c, "/work/a.txt", 5, None));

        let changed = c.on_file_changed(Path::new("/work/a.txt"), 3);
        assert_eq!(changed, vec!["a.txt:5".to_string()]);
        assert_eq!(
            c.get("a.txt:5").unwrap().status(),
            Some(FileStatus::LineNotExist)
        );

        let changed = c.on_file_changed(Path::new("/work/a.txt"), 10);
        assert_eq!(changed, vec!["a.txt:5".to_string()]);
        assert_eq!(
            c.get("a.txt:5").unwrap().status(),
            Some(FileStatus::LineExist)
        );

        // Unchanged classification reports nothing.
        assert!(c.on_file_changed(Path::new("/work/a.txt"), 10).is_empty());
    }

    #[test]
    fn records_round_trip_structural_fields() {
        let mut c = collection();
        c.add(Item::folder("Work", None, true));
        c.add(bookmark(&c, "/work/a.txt", 5, Some("Work")));
        c.add(Item::bookmark(
            c.roots(),
            "/work/b.txt",
            2,
            None,
            Some("note".to_string()),
        ));

        let mut restored = Collection::new(roots());
        restored.load_records(&c.to_records());

        let before: Vec<String> = c.items().iter().map(|i| i.key()).collect();
        let after: Vec<String> = restored.items().iter().map(|i| i.key()).collect();
        assert_eq!(before, after);
        assert!(restored.get("Work").unwrap().is_expanded());
        assert_eq!(restored.get("b.txt:2").unwrap().label(), Some("note"));
        assert_eq!(
            restored.get("a.txt:5").unwrap().parent_folder(),
            Some("Work")
        );
    }

    #[test]
    fn load_records_skips_malformed_entries() {
        let mut c = collection();
        let records = vec![
            Item::folder("Work", None, false).to_record(),
            ItemRecord {
                is_folder: false,
                label: None,
                file_path: None,
                line_number: None,
                parent_folder_name: None,
                is_expanded: None,
            },
        ];
        c.load_records(&records);
        assert_eq!(c.len(), 1);
    }
}
