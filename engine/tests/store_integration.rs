use claims::{assert_err, assert_ok};
use engine::backup::BackupManager;
use engine::common::ThemeError;
use engine::model::AnyRecord;
use engine::model::scheme::EmbeddedSchemeRecord;
use engine::model::terminal::{ThemeCollection, ThemeRecord};
use engine::store::atomic::temp_path;
use engine::store::{AlwaysOverwrite, FileFormat, ThemeStore};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

mod store_helpers {
    use super::*;

    pub const RETENTION: usize = 5;

    pub fn store(dir: &Path) -> ThemeStore {
        ThemeStore::new(BackupManager::new(dir.join("backups"), RETENTION))
    }

    pub fn collection_with(names: &[&str]) -> ThemeCollection {
        let mut collection = ThemeCollection::new();
        for name in names {
            collection.insert(ThemeRecord::default_dark(*name)).expect("insert");
        }
        collection
    }
}

use store_helpers::*;

#[test]
fn test_host_document_bytes_outside_schemes_survive_save() {
    let dir = TempDir::new().expect("temp dir");
    let store = store(dir.path());
    let path = dir.path().join("settings.json");

    let head = "\u{feff}{\n    // Terminal settings\n    \"$schema\": \"https://aka.ms/terminal-profiles-schema\",\n    \"profiles\": {\n        \"defaults\": { \"font\": { \"face\": \"Cascadia Mono\" } }, /* trailing */\n        \"list\": []\n    },\n    \"schemes\": ";
    let tail = ",\n    // keybindings follow\n    \"actions\": [ { \"command\": \"copy\", \"keys\": \"ctrl+c\" } ]\n}\n";
    let original = format!("{head}[\n        {{ \"name\": \"Broken\" }}\n    ]{tail}");
    fs::write(&path, &original).expect("seed");

    let scheme = EmbeddedSchemeRecord::from(ThemeRecord::default_dark("Added"));
    assert_ok!(store.save_record(
        &path,
        FileFormat::HostDocument,
        &AnyRecord::WindowsScheme(scheme),
        &AlwaysOverwrite
    ));

    let saved = fs::read_to_string(&path).expect("read");
    assert!(saved.starts_with(head));
    assert!(saved.ends_with(tail));
    assert!(saved.contains("\"Broken\""));

    let (document, schemes) = assert_ok!(store.load_host_document(&path));
    assert_eq!(schemes.len(), 1);
    assert_eq!(document.skipped().len(), 1);
}

#[test]
fn test_unmodified_host_document_renders_identically() {
    let dir = TempDir::new().expect("temp dir");
    let store = store(dir.path());
    let path = dir.path().join("settings.json");
    let original = "{\r\n\t\"schemes\": [],\r\n\t/* nothing */ \"theme\": \"dark\"\r\n}";
    fs::write(&path, original).expect("seed");

    let (document, _) = assert_ok!(store.load_host_document(&path));
    assert_ok!(store.save_host_document(&path, &document));
    assert_eq!(fs::read_to_string(&path).expect("read"), original);
}

#[test]
fn test_backup_rotation_keeps_newest() {
    let dir = TempDir::new().expect("temp dir");
    let store = store(dir.path());
    let path = dir.path().join("themes.json");

    let mut last_replaced = Vec::new();
    for round in 0..7 {
        let names = [format!("Theme {round}")];
        let collection = collection_with(&names.iter().map(String::as_str).collect::<Vec<_>>());
        if path.exists() {
            last_replaced = fs::read(&path).expect("read");
        }
        assert_ok!(store.save_collection(&path, &collection));
    }

    let backups = assert_ok!(store.backups().list(&path));
    assert_eq!(backups.len(), RETENTION);
    let sequences: Vec<u64> = backups.iter().map(|b| b.sequence).collect();
    assert_eq!(sequences, vec![2, 3, 4, 5, 6]);
    assert_eq!(fs::read(&backups[RETENTION - 1].path).expect("read"), last_replaced);
}

#[test]
fn test_failed_write_leaves_original_intact() {
    let dir = TempDir::new().expect("temp dir");
    let store = store(dir.path());
    let path = dir.path().join("themes.json");

    let original = collection_with(&["Keep"]);
    assert_ok!(store.save_collection(&path, &original));
    let before = fs::read(&path).expect("read");

    // a directory where the temp file should go makes the write fail
    fs::create_dir(temp_path(&path)).expect("block temp path");

    let error = assert_err!(store.save_collection(&path, &collection_with(&["Replace"])));
    assert!(matches!(error, ThemeError::Io { .. }));
    assert_eq!(fs::read(&path).expect("read"), before);
    assert_eq!(assert_ok!(store.load_collection(&path)), original);
}

#[test]
fn test_failed_streamed_write_keeps_content() {
    let dir = TempDir::new().expect("temp dir");
    let store = store(dir.path());
    let path = dir.path().join("palette.json");
    fs::write(&path, b"{\"background\": \"#000000\"}").expect("seed");

    let result = store.write_with(&path, |writer| {
        use std::io::Write;
        writer.write_all(b"{\"backgr")?;
        Err(std::io::Error::other("interrupted"))
    });

    assert_err!(result);
    assert_eq!(fs::read(&path).expect("read"), b"{\"background\": \"#000000\"}");
    assert_eq!(assert_ok!(store.backups().list(&path)).len(), 1);
}

#[test]
fn test_convert_terminal_file_to_widget_file() {
    let dir = TempDir::new().expect("temp dir");
    let store = store(dir.path());
    let source = dir.path().join("themes.json");
    let target = dir.path().join("Nord.json");
    assert_ok!(store.save_collection(&source, &collection_with(&["Nord", "Other"])));

    let loaded = assert_ok!(store.load_record(&source, FileFormat::Collection, Some("Nord")));
    let converted = assert_ok!(
        engine::FormatConverter::default().convert(&loaded.record, engine::ThemeKind::Widget)
    );
    assert!(!converted.derived_slots.is_empty());
    assert_ok!(store.save_record(&target, FileFormat::Widget, &converted.record, &AlwaysOverwrite));

    let widget = assert_ok!(store.load_widget_theme(&target));
    assert_eq!(widget.name, "Nord");
    assert!(widget.validate().is_empty());
}
