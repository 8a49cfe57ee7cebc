use std::fs;
use std::path::Path;

use playpen::compiler::Compiler;
use playpen::editor::{mirror_tree, ChangeEvent, EditorBridge, WatchConfig};
use playpen::error::ApiError;
use playpen::preview::{Launcher, PreviewRenderer, PreviewState};
use playpen::store::scaffold::starter_project;
use playpen::store::ProjectStore;
use playpen::StoreEvent;
use tempfile::TempDir;

struct NoLaunch;

impl Launcher for NoLaunch {
    fn open(&self, _target: &Path) -> Result<(), ApiError> {
        Ok(())
    }
}

#[test]
fn edit_on_disk_recompiles_preview() {
    let temp = TempDir::new().unwrap();
    let mirror = temp.path().join("mirror");
    let renderer = PreviewRenderer::new(temp.path().join("preview"), Box::new(NoLaunch));
    let mut bridge = EditorBridge::new(
        ProjectStore::with_tree(starter_project()),
        Compiler::default(),
        renderer,
        WatchConfig::new(&mirror),
    );
    bridge.prepare().unwrap();
    let first = bridge.renderer().state().handle().unwrap().clone();

    let entry = mirror.join("src/app/app.component.ts");
    let source = fs::read_to_string(&entry).unwrap();
    fs::write(&entry, source.replace("count = 0;", "count = 41;")).unwrap();
    let report = bridge
        .process_events(vec![ChangeEvent::Modified(entry)])
        .unwrap();
    assert_eq!(report.compiled, Some(true));

    let PreviewState::Content(second) = bridge.renderer().state() else {
        panic!("expected rendered preview");
    };
    assert_ne!(first.id, second.id);
    assert!(!first.document.exists());
    assert!(fs::read_to_string(&second.document)
        .unwrap()
        .contains("Clicked 41 times"));
}

#[test]
fn mirror_round_trips_every_file() {
    let temp = TempDir::new().unwrap();
    let tree = starter_project();
    mirror_tree(&tree, temp.path()).unwrap();
    for file in tree.files() {
        let on_disk = fs::read_to_string(temp.path().join(&file.path)).unwrap();
        assert_eq!(on_disk, file.text(), "{}", file.path);
    }
}

#[test]
fn store_observers_see_content_edits() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut store = ProjectStore::with_tree(starter_project());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let id = store.tree().find_by_path("src/styles.css").unwrap().id;
    store.update_file_content(id, "body { margin: 1rem; }").unwrap();

    let events = seen.borrow();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], StoreEvent::ContentChanged { file, .. } if file == id));
}
