use std::fs;

use tripane::bookmark::BookmarkStore;
use tripane::bridge::{EditorState, Pane};
use tripane::document::{DocumentStore, PLACEHOLDER_TEXT, SaveOutcome, StoreError};

#[test]
fn test_open_edit_save_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.md");
    fs::write(&path, "# Notes\n").unwrap();

    let mut store = DocumentStore::new(dir.path().to_path_buf());
    let mut editor = EditorState::new(store.create_new());
    editor.open_document(store.open(&path).unwrap());
    assert_eq!(editor.text(), "# Notes\n");
    assert!(!editor.is_dirty());

    editor.edit("# Notes\n\nMore.\n", Pane::Raw);
    assert!(editor.is_dirty());

    let text = editor.text().to_string();
    let outcome = store.save(editor.document_mut(), &text).unwrap();
    assert_eq!(outcome, SaveOutcome::Saved(path.clone()));
    editor.mark_saved();

    assert!(!editor.is_dirty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "# Notes\n\nMore.\n");
}

#[test]
fn test_untitled_save_needs_location_then_save_as() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DocumentStore::new(dir.path().to_path_buf());
    let mut editor = EditorState::new(store.create_new());
    assert_eq!(editor.text(), PLACEHOLDER_TEXT);

    let text = editor.text().to_string();
    let outcome = store.save(editor.document_mut(), &text).unwrap();
    let SaveOutcome::NeedsLocation { suggested } = outcome else {
        panic!("untitled document should need a location");
    };
    assert_eq!(suggested, dir.path().join("Untitled.md"));

    let saved = store
        .save_as(editor.document_mut(), &text, &dir.path().join("draft"))
        .unwrap();
    assert_eq!(saved, dir.path().join("draft.md"));
    assert_eq!(editor.document().name(), "draft.md");
    assert_eq!(fs::read_to_string(&saved).unwrap(), PLACEHOLDER_TEXT);
}

#[test]
fn test_open_rejects_invalid_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("binary.md");
    fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

    let mut store = DocumentStore::new(dir.path().to_path_buf());
    let err = store.open(&path).unwrap_err();
    assert!(matches!(err, StoreError::Read { .. }));
}

#[test]
fn test_listing_filters_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Zeta.md"), "").unwrap();
    fs::write(dir.path().join("alpha.markdown"), "").unwrap();
    fs::write(dir.path().join(".hidden.md"), "").unwrap();
    fs::write(dir.path().join("image.png"), "").unwrap();
    fs::create_dir(dir.path().join("folder.md")).unwrap();

    let store = DocumentStore::new(dir.path().to_path_buf());
    let names: Vec<String> = store
        .list_last_dir()
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, vec!["alpha.markdown", "Zeta.md"]);
}

#[test]
fn test_last_directory_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::write(docs.join("a.md"), "a").unwrap();
    let bookmark_file = dir.path().join("state").join("last_directory.json");

    let mut store = DocumentStore::restore(BookmarkStore::new(bookmark_file.clone()), dir.path());
    assert_eq!(store.last_dir(), dir.path());
    store.open(&docs.join("a.md")).unwrap();
    assert_eq!(store.last_dir(), docs.as_path());

    let restarted = DocumentStore::restore(BookmarkStore::new(bookmark_file), dir.path());
    assert_eq!(restarted.last_dir(), docs.as_path());
}

#[test]
fn test_missing_bookmarked_directory_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let gone = dir.path().join("gone");
    fs::create_dir(&gone).unwrap();
    let bookmark_file = dir.path().join("last_directory.json");
    BookmarkStore::new(bookmark_file.clone()).save(&gone).unwrap();
    fs::remove_dir(&gone).unwrap();

    let store = DocumentStore::restore(BookmarkStore::new(bookmark_file), dir.path());
    assert_eq!(store.last_dir(), dir.path());
}
