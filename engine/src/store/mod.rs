//! # Theme Store
//!
//! Load and save every on-disk representation. All writes go through the same
//! path:
//!
//! 1. back up the existing file (if any) with [`BackupManager`]
//! 2. write atomically (temp file + rename, see [`atomic`])
//! 3. on success rotate old backups, on failure restore the backup
//!
//! Destructive saves of single records ask an [`OverwriteConfirmer`] first;
//! the store never decides that policy itself.

pub mod atomic;
pub mod scheduler;

use crate::backup::BackupManager;
use crate::common::errors::{ThemeError, ThemeResult, ValidationError};
use crate::converter::Conversion;
use crate::host_document::HostDocument;
use crate::model::palette::PaletteRecord;
use crate::model::scheme::EmbeddedSchemeRecord;
use crate::model::terminal::ThemeCollection;
use crate::model::widget::WidgetThemeRecord;
use crate::model::{AnyRecord, ThemeKind};
use crate::stylesheet;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Skeleton used when a scheme is saved into a host document that does not
/// exist yet.
const EMPTY_HOST_DOCUMENT: &str = "{\n    \"schemes\": []\n}\n";

/// On-disk representations, each holding one record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Theme collection file (terminal themes keyed by name).
    Collection,
    /// Terminal host settings document with a `schemes` array.
    HostDocument,
    /// Flat 8-slot palette JSON.
    Palette,
    /// Qt stylesheet rendered from or extracted to a palette.
    Stylesheet,
    /// Widget-toolkit theme JSON.
    Widget,
}

impl FileFormat {
    pub const ALL: [FileFormat; 5] = [
        FileFormat::Collection,
        FileFormat::HostDocument,
        FileFormat::Palette,
        FileFormat::Stylesheet,
        FileFormat::Widget,
    ];

    pub fn kind(self) -> ThemeKind {
        match self {
            FileFormat::Collection => ThemeKind::Terminal,
            FileFormat::HostDocument => ThemeKind::WindowsScheme,
            FileFormat::Palette | FileFormat::Stylesheet => ThemeKind::Palette,
            FileFormat::Widget => ThemeKind::Widget,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileFormat::Collection => "terminal",
            FileFormat::HostDocument => "windows-terminal",
            FileFormat::Palette => "palette",
            FileFormat::Stylesheet => "stylesheet",
            FileFormat::Widget => "widget",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = FileFormat::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown format '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// What a destructive save would discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteReason {
    /// A same-named theme in a collection file.
    ReplaceTheme,
    /// A same-named scheme in a host document.
    ReplaceScheme,
    /// A whole single-record file.
    ReplaceFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverwriteRequest {
    pub path: PathBuf,
    pub name: Option<String>,
    pub reason: OverwriteReason,
}

/// Decides whether a destructive save may proceed.
pub trait OverwriteConfirmer {
    fn confirm_overwrite(&self, request: &OverwriteRequest) -> bool;
}

impl<F> OverwriteConfirmer for F
where
    F: Fn(&OverwriteRequest) -> bool,
{
    fn confirm_overwrite(&self, request: &OverwriteRequest) -> bool {
        self(request)
    }
}

/// Confirms every overwrite (`--force`).
pub struct AlwaysOverwrite;

impl OverwriteConfirmer for AlwaysOverwrite {
    fn confirm_overwrite(&self, _request: &OverwriteRequest) -> bool {
        true
    }
}

/// Declines every overwrite.
pub struct NeverOverwrite;

impl OverwriteConfirmer for NeverOverwrite {
    fn confirm_overwrite(&self, _request: &OverwriteRequest) -> bool {
        false
    }
}

/// Reads and writes theme files. Holds configuration only.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    backups: BackupManager,
}

impl ThemeStore {
    pub fn new(backups: BackupManager) -> Self {
        Self { backups }
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    pub fn load_collection(&self, path: &Path) -> ThemeResult<ThemeCollection> {
        let bytes = read(path)?;
        ThemeCollection::load(&bytes).map_err(|e| in_file(e, path))
    }

    pub fn save_collection(&self, path: &Path, collection: &ThemeCollection) -> ThemeResult<()> {
        let bytes = collection.serialize()?;
        self.write_bytes(path, &bytes)
    }

    pub fn load_host_document(
        &self,
        path: &Path,
    ) -> ThemeResult<(HostDocument, Vec<EmbeddedSchemeRecord>)> {
        let bytes = read(path)?;
        HostDocument::load(&bytes).map_err(|e| in_file(e, path))
    }

    pub fn save_host_document(&self, path: &Path, document: &HostDocument) -> ThemeResult<()> {
        self.write_bytes(path, &document.render())
    }

    pub fn load_palette(&self, path: &Path) -> ThemeResult<PaletteRecord> {
        let bytes = read(path)?;
        PaletteRecord::load(&bytes).map_err(|e| in_file(e, path))
    }

    pub fn save_palette(&self, path: &Path, palette: &PaletteRecord) -> ThemeResult<()> {
        self.write_bytes(path, &palette.serialize()?)
    }

    /// The theme is named after the file stem.
    pub fn load_widget_theme(&self, path: &Path) -> ThemeResult<WidgetThemeRecord> {
        let bytes = read(path)?;
        WidgetThemeRecord::load(&bytes, file_stem(path)).map_err(|e| in_file(e, path))
    }

    pub fn save_widget_theme(&self, path: &Path, theme: &WidgetThemeRecord) -> ThemeResult<()> {
        self.write_bytes(path, &theme.serialize()?)
    }

    /// Extract a palette; slots the stylesheet does not define are reported.
    pub fn load_stylesheet(&self, path: &Path) -> ThemeResult<Conversion<PaletteRecord>> {
        let bytes = read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| ThemeError::parse(path.display().to_string(), e))?;
        Ok(stylesheet::extract_palette(&text))
    }

    pub fn save_stylesheet(&self, path: &Path, palette: &PaletteRecord) -> ThemeResult<()> {
        self.write_bytes(path, stylesheet::render_stylesheet(palette).as_bytes())
    }

    /// Load one record from any format.
    ///
    /// For multi-theme files `theme` selects by name; without it the first
    /// theme is used. `derived_slots` is only non-empty for stylesheets.
    pub fn load_record(
        &self,
        path: &Path,
        format: FileFormat,
        theme: Option<&str>,
    ) -> ThemeResult<Conversion<AnyRecord>> {
        let record = match format {
            FileFormat::Collection => {
                let collection = self.load_collection(path)?;
                let selected = match theme {
                    Some(name) => collection.get(name),
                    None => collection.iter().next(),
                };
                AnyRecord::Terminal(selected.cloned().ok_or_else(|| not_found(theme, path))?)
            }
            FileFormat::HostDocument => {
                let (_, schemes) = self.load_host_document(path)?;
                let selected = match theme {
                    Some(name) => schemes.into_iter().find(|s| s.name() == name),
                    None => schemes.into_iter().next(),
                };
                AnyRecord::WindowsScheme(selected.ok_or_else(|| not_found(theme, path))?)
            }
            FileFormat::Palette => AnyRecord::Palette(self.load_palette(path)?),
            FileFormat::Stylesheet => {
                return Ok(self.load_stylesheet(path)?.map(AnyRecord::Palette));
            }
            FileFormat::Widget => AnyRecord::Widget(self.load_widget_theme(path)?),
        };
        Ok(Conversion::exact(record))
    }

    /// Save one record into `path`, merging into collection and host files.
    ///
    /// Replacing a same-named theme or scheme, or overwriting a single-record
    /// file, needs the confirmer's consent; a refusal writes nothing.
    pub fn save_record(
        &self,
        path: &Path,
        format: FileFormat,
        record: &AnyRecord,
        confirmer: &dyn OverwriteConfirmer,
    ) -> ThemeResult<()> {
        if record.kind() != format.kind() {
            return Err(ThemeError::validation(
                format!("save to {}", path.display()),
                vec![ValidationError::invalid_format(format!(
                    "{} record cannot be stored as {format}",
                    record.kind()
                ))],
            ));
        }

        let confirm = |name: Option<&str>, reason: OverwriteReason| {
            let request = OverwriteRequest {
                path: path.to_path_buf(),
                name: name.map(str::to_string),
                reason,
            };
            if confirmer.confirm_overwrite(&request) {
                Ok(())
            } else {
                log::info!("Overwrite of {} declined", path.display());
                Err(ThemeError::OverwriteDeclined {
                    path: path.to_path_buf(),
                })
            }
        };

        match record {
            AnyRecord::Terminal(theme) => {
                let mut collection = if path.exists() {
                    self.load_collection(path)?
                } else {
                    ThemeCollection::new()
                };
                if collection.contains(&theme.name) {
                    confirm(Some(theme.name.as_str()), OverwriteReason::ReplaceTheme)?;
                }
                collection.upsert(theme.clone());
                self.save_collection(path, &collection)
            }
            AnyRecord::WindowsScheme(scheme) => {
                let mut document = if path.exists() {
                    self.load_host_document(path)?.0
                } else {
                    HostDocument::parse(EMPTY_HOST_DOCUMENT.as_bytes())?
                };
                if document.contains(scheme.name()) {
                    confirm(Some(scheme.name()), OverwriteReason::ReplaceScheme)?;
                }
                document.upsert_scheme(scheme.clone());
                self.save_host_document(path, &document)
            }
            AnyRecord::Palette(palette) => {
                if path.exists() {
                    confirm(None, OverwriteReason::ReplaceFile)?;
                }
                match format {
                    FileFormat::Stylesheet => self.save_stylesheet(path, palette),
                    _ => self.save_palette(path, palette),
                }
            }
            AnyRecord::Widget(theme) => {
                if path.exists() {
                    confirm(Some(theme.name.as_str()), OverwriteReason::ReplaceFile)?;
                }
                self.save_widget_theme(path, theme)
            }
        }
    }

    /// Write `template` to `path` unless a file is already there.
    ///
    /// Returns whether the file was created. The template must be a valid
    /// collection.
    pub fn ensure_default_collection_exists(
        &self,
        path: &Path,
        template: &[u8],
    ) -> ThemeResult<bool> {
        if path.exists() {
            return Ok(false);
        }

        ThemeCollection::load(template)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ThemeError::io(parent, e))?;
        }
        atomic::write_atomic(path, template)?;

        log::info!("Created default theme collection at {}", path.display());
        Ok(true)
    }

    pub fn write_bytes(&self, path: &Path, bytes: &[u8]) -> ThemeResult<()> {
        self.write_with(path, |writer| writer.write_all(bytes))
    }

    /// Backed-up atomic write. On failure the pre-write backup is restored;
    /// if that also fails the error is a [`ThemeError::Backup`].
    pub fn write_with<F>(&self, path: &Path, write: F) -> ThemeResult<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
    {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ThemeError::io(parent, e))?;
        }

        let backup = self.backups.create_backup(path)?;

        match atomic::write_atomic_with(path, write) {
            Ok(()) => {
                if backup.is_some() {
                    if let Err(error) = self.backups.rotate(path) {
                        log::warn!("Backup rotation failed for {}: {error}", path.display());
                    }
                }
                Ok(())
            }
            Err(error) => {
                log::error!("Write to {} failed: {error}", path.display());
                if let Some(backup) = backup {
                    if needs_restore(path, &backup) {
                        self.backups.restore(&backup, path)?;
                    }
                }
                Err(error)
            }
        }
    }
}

/// Whether `path` no longer matches its backup.
fn needs_restore(path: &Path, backup: &Path) -> bool {
    match (fs::read(path), fs::read(backup)) {
        (Ok(current), Ok(saved)) => current != saved,
        _ => true,
    }
}

fn read(path: &Path) -> ThemeResult<Vec<u8>> {
    fs::read(path).map_err(|e| ThemeError::io(path, e))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn not_found(theme: Option<&str>, path: &Path) -> ThemeError {
    ThemeError::NotFound {
        name: theme.map_or_else(
            || format!("any theme in {}", path.display()),
            str::to_string,
        ),
    }
}

/// Attach the file path to parse and validation errors.
fn in_file(error: ThemeError, path: &Path) -> ThemeError {
    match error {
        ThemeError::Parse {
            source_name,
            message,
        } => ThemeError::Parse {
            source_name: format!("{source_name} {}", path.display()),
            message,
        },
        ThemeError::Validation { context, errors } => ThemeError::Validation {
            context: format!("{context} in {}", path.display()),
            errors,
        },
        other => other,
    }
}
