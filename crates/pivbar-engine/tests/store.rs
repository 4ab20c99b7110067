use std::{fs, sync::Arc};

use pivbar_engine::{
    FileBackend, KvBackend, Preferences, StoreError, ThemeKind,
    store::{THEME_COLOR_KEY, THEME_TYPE_KEY},
};

#[test]
fn file_backend_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("prefs.json");

    let prefs = Preferences::new(Arc::new(FileBackend::new(&path)));
    assert!(prefs.theme().is_none());
    assert!(prefs.save_theme("#1e293b", ThemeKind::Custom));

    let reopened = Preferences::new(Arc::new(FileBackend::new(&path)));
    let theme = reopened.theme().unwrap();
    assert_eq!(theme.color, "#1e293b");
    assert_eq!(theme.kind, ThemeKind::Custom);

    let on_disk: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk[THEME_COLOR_KEY], "\"#1e293b\"");
    assert_eq!(on_disk[THEME_TYPE_KEY], "\"custom\"");
}

#[test]
fn file_backend_remove_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FileBackend::new(dir.path().join("prefs.json")));
    let prefs = Preferences::new(backend.clone());
    prefs.save_theme("#0f172a", ThemeKind::Preset);
    prefs.save_fullscreen_mode("hide-all");

    assert!(prefs.clear_theme());
    assert!(prefs.theme().is_none());
    assert_eq!(prefs.fullscreen_mode().as_deref(), Some("hide-all"));

    assert!(prefs.clear());
    assert!(!prefs.has("piv_fullscreen_mode"));
    assert_eq!(backend.get(THEME_COLOR_KEY).unwrap(), None);
}

#[test]
fn corrupt_file_reads_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    fs::write(&path, "{ not json").unwrap();
    let backend = FileBackend::new(&path);
    assert!(matches!(backend.get(THEME_COLOR_KEY), Err(StoreError::Corrupt(_))));

    let prefs = Preferences::new(Arc::new(backend));
    assert!(prefs.theme().is_none());
    assert!(!prefs.save_theme("#0f172a", ThemeKind::Preset));
}

#[test]
fn empty_file_is_an_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    fs::write(&path, "\n").unwrap();
    let prefs = Preferences::new(Arc::new(FileBackend::new(&path)));
    assert!(prefs.theme().is_none());
    assert!(prefs.save_theme("#f3f4f6", ThemeKind::Preset));
    assert_eq!(prefs.theme().unwrap().color, "#f3f4f6");
}
