use claims::{assert_err, assert_ok};
use engine::backup::BackupManager;
use engine::converter::FormatConverter;
use engine::model::TerminalSlot;
use engine::store::{AlwaysOverwrite, FileFormat, NeverOverwrite, ThemeStore};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use themeshift::config::defaults::DEFAULT_COLLECTION;
use themeshift::AppError;
use themeshift::convert::{ConvertRequest, ConvertSource, run_convert};
use themeshift::error::{EXIT_IO, EXIT_VALIDATION};

// Helper module for conversion runs
mod convert_helpers {
    use super::*;

    pub fn store(dir: &Path) -> ThemeStore {
        ThemeStore::new(BackupManager::new(dir.join("backups"), 5))
    }

    /// A temp dir holding the bundled collection as `themes.json`.
    pub fn workspace() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let collection = dir.path().join("themes.json");
        fs::write(&collection, DEFAULT_COLLECTION).expect("seed collection");
        (dir, collection)
    }

    pub fn request(
        input: &Path,
        input_format: FileFormat,
        output: &Path,
        output_format: FileFormat,
    ) -> ConvertRequest {
        ConvertRequest {
            source: ConvertSource::File {
                path: input.to_path_buf(),
                format: input_format,
                theme: None,
            },
            output: output.to_path_buf(),
            output_format,
            name: None,
        }
    }

    /// Pick `name` from a multi-theme source.
    pub fn with_theme(mut request: ConvertRequest, name: &str) -> ConvertRequest {
        if let ConvertSource::File { theme, .. } = &mut request.source {
            *theme = Some(name.to_string());
        }
        request
    }
}

use convert_helpers::*;

#[test]
fn test_terminal_to_stylesheet_and_back() {
    let (dir, collection) = workspace();
    let store = store(dir.path());
    let converter = FormatConverter::default();
    let qss = dir.path().join("default.qss");

    let to_qss = with_theme(
        request(&collection, FileFormat::Collection, &qss, FileFormat::Stylesheet),
        "Default",
    );
    let report = assert_ok!(run_convert(&store, &converter, &to_qss, &AlwaysOverwrite));
    assert!(report.name.is_none());
    assert!(report.derived_slots.contains("disabled"));
    assert!(fs::read_to_string(&qss).expect("read").contains("QPushButton"));

    let mut back = request(&qss, FileFormat::Stylesheet, &collection, FileFormat::Collection);
    back.name = Some("From QSS".to_string());
    let report = assert_ok!(run_convert(&store, &converter, &back, &AlwaysOverwrite));
    assert_eq!(report.name.as_deref(), Some("From QSS"));
    assert!(report.defaulted_input_slots.is_empty());

    let themes = assert_ok!(store.load_collection(&collection));
    assert_eq!(themes.names().collect::<Vec<_>>(), vec!["Default", "Default Light", "From QSS"]);
}

#[test]
fn test_scheme_into_existing_host_document() {
    let (dir, collection) = workspace();
    let store = store(dir.path());
    let settings = dir.path().join("settings.json");
    let original = "{\n    // profiles stay untouched\n    \"profiles\": { \"list\": [] },\n    \"schemes\": []\n}\n";
    fs::write(&settings, original).expect("seed settings");

    let to_host = with_theme(
        request(&collection, FileFormat::Collection, &settings, FileFormat::HostDocument),
        "Default Light",
    );
    let report =
        assert_ok!(run_convert(&store, &FormatConverter::default(), &to_host, &AlwaysOverwrite));
    assert!(report.derived_slots.is_empty());

    let saved = fs::read_to_string(&settings).expect("read");
    assert!(saved.starts_with("{\n    // profiles stay untouched\n    \"profiles\": { \"list\": [] },\n    \"schemes\": ["));
    assert!(saved.contains("\"cursorColor\": \"#3C3836\""));
}

#[test]
fn test_declined_overwrite_is_a_validation_failure() {
    let (dir, collection) = workspace();
    let store = store(dir.path());
    let before = fs::read(&collection).expect("read");

    // the same theme back into its own collection
    let same = with_theme(
        request(&collection, FileFormat::Collection, &collection, FileFormat::Collection),
        "Default",
    );

    let error =
        assert_err!(run_convert(&store, &FormatConverter::default(), &same, &NeverOverwrite));
    assert_eq!(error.exit_code(), EXIT_VALIDATION);
    assert_eq!(fs::read(&collection).expect("read"), before);
}

#[test]
fn test_missing_input_is_an_io_failure() {
    let (dir, _) = workspace();
    let store = store(dir.path());
    let missing = dir.path().join("missing.json");
    let output = dir.path().join("out.json");

    let error = assert_err!(run_convert(
        &store,
        &FormatConverter::default(),
        &request(&missing, FileFormat::Palette, &output, FileFormat::Widget),
        &AlwaysOverwrite
    ));
    assert_eq!(error.exit_code(), EXIT_IO);
    assert!(!output.exists());
}

#[test]
fn test_invalid_source_reports_every_slot() {
    let (dir, _) = workspace();
    let store = store(dir.path());
    let palette = dir.path().join("palette.json");
    fs::write(&palette, r##"{"background": "#12", "foreground": "#FFFFFF"}"##).expect("seed");

    let error = assert_err!(run_convert(
        &store,
        &FormatConverter::default(),
        &request(
            &palette,
            FileFormat::Palette,
            &dir.path().join("out.json"),
            FileFormat::Collection
        ),
        &AlwaysOverwrite
    ));
    assert_eq!(error.exit_code(), EXIT_VALIDATION);
    let message = error.user_message();
    assert!(message.contains("background"));
    assert!(message.contains("primary"));
}

#[test]
fn test_unknown_theme_is_a_validation_failure() {
    let (dir, collection) = workspace();
    let store = store(dir.path());
    let output = dir.path().join("p.json");
    let missing = with_theme(
        request(&collection, FileFormat::Collection, &output, FileFormat::Palette),
        "Solarized",
    );

    let error =
        assert_err!(run_convert(&store, &FormatConverter::default(), &missing, &AlwaysOverwrite));
    assert_eq!(error.exit_code(), EXIT_VALIDATION);
}

#[test]
fn test_preset_into_collection() {
    let (dir, collection) = workspace();
    let store = store(dir.path());
    let preset = ConvertRequest {
        source: ConvertSource::Preset("Material Dark".to_string()),
        output: collection.clone(),
        output_format: FileFormat::Collection,
        name: Some("Material".to_string()),
    };

    let report =
        assert_ok!(run_convert(&store, &FormatConverter::default(), &preset, &AlwaysOverwrite));
    assert_eq!(report.name.as_deref(), Some("Material"));
    assert!(!report.derived_slots.is_empty());

    let themes = assert_ok!(store.load_collection(&collection));
    let material = themes.get("Material").expect("saved");
    assert_eq!(material.get(TerminalSlot::Background).to_hex(false), "#1E1E1E");
}

#[test]
fn test_unknown_preset_is_a_usage_error() {
    let (dir, _) = workspace();
    let store = store(dir.path());
    let output = dir.path().join("out.qss");
    let unknown = ConvertRequest {
        source: ConvertSource::Preset("Neon".to_string()),
        output: output.clone(),
        output_format: FileFormat::Stylesheet,
        name: None,
    };

    let error =
        assert_err!(run_convert(&store, &FormatConverter::default(), &unknown, &AlwaysOverwrite));
    assert!(matches!(error, AppError::Usage(_)));
    assert!(error.user_message().contains("Material Dark"));
    assert_eq!(error.exit_code(), EXIT_VALIDATION);
    assert!(!output.exists());
}
