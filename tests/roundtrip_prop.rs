//! Property tests over generated collections.

use linemark::collection::Collection;
use linemark::item::{Item, ItemRecord};
use linemark::paths::WorkspaceRoots;
use proptest::prelude::*;
use std::path::PathBuf;

fn roots() -> WorkspaceRoots {
    WorkspaceRoots::new(vec![PathBuf::from("/work")])
}

/// Generation model: up to 5 folders (parents always earlier folders, so the
/// link graph is acyclic by construction) and up to 12 bookmarks attached to
/// any folder or the top level.
fn arb_setup() -> impl Strategy<Value = (Vec<Option<usize>>, Vec<(u8, u32, bool, Option<usize>)>)>
{
    (0usize..5).prop_flat_map(|folder_count| {
        (
            proptest::collection::vec(proptest::option::of(0usize..5), folder_count),
            proptest::collection::vec(
                (0u8..5, 1u32..40, any::<bool>(), proptest::option::of(0usize..5)),
                0..12,
            ),
        )
    })
}

fn build_collection(
    folder_parents: &[Option<usize>],
    bookmarks: &[(u8, u32, bool, Option<usize>)],
) -> Collection {
    let folder_count = folder_parents.len();
    let mut c = Collection::new(roots());

    for (i, parent) in folder_parents.iter().enumerate() {
        let parent = match parent {
            Some(raw) if i > 0 => Some(format!("folder-{}", raw % i)),
            _ => None,
        };
        c.add(Item::folder(format!("folder-{}", i), parent, i % 2 == 0));
    }

    for (file, line, labeled, parent) in bookmarks {
        let parent = match parent {
            Some(raw) if folder_count > 0 => Some(format!("folder-{}", raw % folder_count)),
            _ => None,
        };
        let label = labeled.then(|| format!("note-{}", line));
        c.add(Item::bookmark(
            c.roots(),
            format!("/work/file-{}.txt", file),
            *line,
            parent,
            label,
        ));
    }
    c
}

proptest! {
    #[test]
    fn serialization_round_trip_preserves_structure(
        (folder_parents, bookmarks) in arb_setup()
    ) {
        let original = build_collection(&folder_parents, &bookmarks);

        let json = serde_json::to_string(&original.to_records()).unwrap();
        let parsed: Vec<ItemRecord> = serde_json::from_str(&json).unwrap();

        let mut restored = Collection::new(roots());
        restored.load_records(&parsed);

        prop_assert_eq!(restored.items(), original.items());
    }

    #[test]
    fn folder_removal_takes_exactly_its_descendants(
        (folder_parents, bookmarks) in arb_setup()
    ) {
        let mut c = build_collection(&folder_parents, &bookmarks);
        prop_assume!(!folder_parents.is_empty());

        let folder = c.get("folder-0").unwrap().clone();
        let mut expected_gone: Vec<String> =
            c.all_children(&folder).iter().map(|i| i.key()).collect();
        expected_gone.push(folder.key());
        let expected_remaining = c.len() - expected_gone.len();

        c.remove_by_key("folder-0");

        prop_assert_eq!(c.len(), expected_remaining);
        for key in &expected_gone {
            prop_assert!(!c.contains_key(key));
        }
    }

    #[test]
    fn move_before_only_permutes(
        (folder_parents, bookmarks) in arb_setup(),
        source_pick in 0usize..20,
        target_pick in 0usize..20,
    ) {
        let mut c = build_collection(&folder_parents, &bookmarks);
        prop_assume!(c.len() >= 2);

        let source = c.items()[source_pick % c.len()].clone();
        let target = c.items()[target_pick % c.len()].clone();
        let mut before: Vec<String> = c.items().iter().map(|i| i.key()).collect();

        c.move_before(&source, &target);

        let mut after: Vec<String> = c.items().iter().map(|i| i.key()).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }
}
