use playpen::store::ProjectStore;
use playpen::tree::FileNode;
use playpen::NodeId;
use proptest::prelude::*;

const NAMES: &[&str] = &["a", "b.ts", "c.css", "lib", "app.component.ts"];

#[derive(Debug, Clone)]
enum Op {
    CreateFile { parent: usize, name: usize },
    CreateFolder { parent: usize, name: usize },
    Delete { target: usize },
    Rename { target: usize, name: usize },
    Select { target: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), 0..NAMES.len()).prop_map(|(parent, name)| Op::CreateFile { parent, name }),
        (any::<usize>(), 0..NAMES.len()).prop_map(|(parent, name)| Op::CreateFolder { parent, name }),
        any::<usize>().prop_map(|target| Op::Delete { target }),
        (any::<usize>(), 0..NAMES.len()).prop_map(|(target, name)| Op::Rename { target, name }),
        any::<usize>().prop_map(|target| Op::Select { target }),
    ]
}

fn all_ids(store: &ProjectStore) -> Vec<NodeId> {
    store
        .tree()
        .roots()
        .iter()
        .flat_map(|root| root.subtree_ids())
        .collect()
}

fn folder_ids(store: &ProjectStore) -> Vec<NodeId> {
    all_ids(store)
        .into_iter()
        .filter(|id| store.tree().get(*id).map(FileNode::is_folder).unwrap_or(false))
        .collect()
}

fn pick(ids: &[NodeId], index: usize) -> Option<NodeId> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()])
    }
}

fn apply(store: &mut ProjectStore, op: &Op) {
    match *op {
        Op::CreateFile { parent, name } => {
            if let Some(parent) = pick(&folder_ids(store), parent) {
                let _ = store.create_file(parent, NAMES[name], None);
            }
        }
        Op::CreateFolder { parent, name } => {
            if let Some(parent) = pick(&folder_ids(store), parent) {
                let _ = store.create_folder(parent, NAMES[name]);
            }
        }
        Op::Delete { target } => {
            if let Some(id) = pick(&all_ids(store), target) {
                let _ = store.delete_node(id);
            }
        }
        Op::Rename { target, name } => {
            if let Some(id) = pick(&all_ids(store), target) {
                let _ = store.rename_node(id, NAMES[name]);
            }
        }
        Op::Select { target } => {
            if let Some(id) = pick(&all_ids(store), target) {
                let _ = store.select_file(id);
            }
        }
    }
}

fn assert_paths(node: &FileNode, parent_path: Option<&str>) {
    let expected = match parent_path {
        Some(parent) => format!("{}/{}", parent, node.name),
        None => node.name.clone(),
    };
    assert_eq!(node.path, expected);
    for child in &node.children {
        assert_paths(child, Some(&node.path));
    }
}

fn seeded_store() -> ProjectStore {
    let mut store = ProjectStore::new();
    let root = store.create_root_folder("src").unwrap();
    store.create_folder(root, "app").unwrap();
    store
}

proptest! {
    #[test]
    fn paths_follow_structure(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut store = seeded_store();
        for op in &ops {
            apply(&mut store, op);
        }
        for root in store.tree().roots() {
            assert_paths(root, None);
        }
        prop_assert!(store.tree().validate().is_ok());

        // Every open tab names a file that still exists.
        for id in store.tabs().open_tabs() {
            let node = store.tree().get(*id);
            prop_assert!(node.map(FileNode::is_file).unwrap_or(false));
        }
        if let Some(active) = store.tabs().active() {
            prop_assert!(store.tabs().is_open(active));
        }
    }

    #[test]
    fn rename_rewrites_exactly_the_subtree_prefix(
        ops in prop::collection::vec(op_strategy(), 0..25),
        target in any::<usize>(),
        name in 0..NAMES.len(),
    ) {
        let mut store = seeded_store();
        for op in &ops {
            apply(&mut store, op);
        }
        let folders = folder_ids(&store);
        let id = pick(&folders, target).unwrap();
        let old_prefix = store.tree().get(id).unwrap().path.clone();
        let subtree: Vec<NodeId> = store.tree().get(id).unwrap().subtree_ids();
        let before: Vec<(NodeId, String)> = all_ids(&store)
            .into_iter()
            .map(|n| (n, store.tree().get(n).unwrap().path.clone()))
            .collect();

        store.rename_node(id, NAMES[name]).unwrap();
        let new_prefix = store.tree().get(id).unwrap().path.clone();

        for (node, old_path) in before {
            let new_path = &store.tree().get(node).unwrap().path;
            if subtree.contains(&node) {
                let suffix = &old_path[old_prefix.len()..];
                prop_assert_eq!(new_path.clone(), format!("{}{}", new_prefix, suffix));
            } else {
                prop_assert_eq!(new_path, &old_path);
            }
        }
    }
}
