//! One conversion run: load, convert, validate, save.

use crate::error::{AppError, AppResult};
use engine::common::ThemeError;
use engine::converter::{Conversion, FormatConverter};
use engine::model::AnyRecord;
use engine::model::palette::{PRESET_NAMES, PaletteRecord};
use engine::store::{FileFormat, OverwriteConfirmer, OverwriteReason, OverwriteRequest, ThemeStore};
use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

/// Where the theme to convert comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertSource {
    File {
        path: PathBuf,
        format: FileFormat,
        /// Theme to pick from a multi-theme source.
        theme: Option<String>,
    },
    /// One of the built-in palettes.
    Preset(String),
}

impl fmt::Display for ConvertSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertSource::File { path, .. } => write!(f, "{}", path.display()),
            ConvertSource::Preset(name) => write!(f, "preset '{name}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub source: ConvertSource,
    pub output: PathBuf,
    pub output_format: FileFormat,
    /// Name for the converted record.
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertReport {
    pub output: PathBuf,
    /// Name of the saved record; palettes have none.
    pub name: Option<String>,
    /// Source slots the input did not define (stylesheets only).
    pub defaulted_input_slots: BTreeSet<String>,
    /// Target slots synthesized by the conversion.
    pub derived_slots: BTreeSet<String>,
    pub low_contrast: bool,
}

pub fn run_convert(
    store: &ThemeStore,
    converter: &FormatConverter,
    request: &ConvertRequest,
    confirmer: &dyn OverwriteConfirmer,
) -> AppResult<ConvertReport> {
    log::info!(
        "Converting {} to {} ({})",
        request.source,
        request.output.display(),
        request.output_format
    );

    let source = load_source(store, &request.source)?;
    let errors = source.record.validate();
    if !errors.is_empty() {
        return Err(ThemeError::validation(request.source.to_string(), errors).into());
    }
    if !source.derived_slots.is_empty() {
        log::warn!(
            "{} does not define {}; defaults were used",
            request.source,
            join(&source.derived_slots)
        );
    }

    let converted = converter.convert_named(
        &source.record,
        request.output_format.kind(),
        request.name.as_deref(),
    )?;
    if !converted.derived_slots.is_empty() {
        log::warn!("Derived slots: {}", join(&converted.derived_slots));
    }

    let low_contrast = converted.record.has_low_contrast();
    if low_contrast {
        log::warn!("Foreground and background contrast is below the WCAG AA ratio");
    }

    store.save_record(&request.output, request.output_format, &converted.record, confirmer)?;
    log::info!("Saved {}", request.output.display());

    Ok(ConvertReport {
        output: request.output.clone(),
        name: converted.record.name().map(str::to_string),
        defaulted_input_slots: source.derived_slots,
        derived_slots: converted.derived_slots,
        low_contrast,
    })
}

fn load_source(store: &ThemeStore, source: &ConvertSource) -> AppResult<Conversion<AnyRecord>> {
    match source {
        ConvertSource::File { path, format, theme } => {
            Ok(store.load_record(path, *format, theme.as_deref())?)
        }
        ConvertSource::Preset(name) => {
            let palette = PaletteRecord::preset(name).ok_or_else(|| {
                AppError::Usage(format!(
                    "Unknown preset '{name}'. Available: {}",
                    PRESET_NAMES.join(", ")
                ))
            })?;
            Ok(Conversion::exact(AnyRecord::Palette(palette)))
        }
    }
}

fn join(slots: &BTreeSet<String>) -> String {
    slots.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Asks on the terminal. Declines when stdin is not interactive.
pub struct PromptConfirmer;

impl OverwriteConfirmer for PromptConfirmer {
    fn confirm_overwrite(&self, request: &OverwriteRequest) -> bool {
        if !io::stdin().is_terminal() {
            log::warn!("{} Use --force to overwrite.", describe(request));
            return false;
        }

        eprint!("{} Overwrite? [y/N] ", describe(request));
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

pub fn describe(request: &OverwriteRequest) -> String {
    let name = request.name.as_deref().unwrap_or_default();
    match request.reason {
        OverwriteReason::ReplaceTheme => {
            format!("Theme '{name}' already exists in {}.", request.path.display())
        }
        OverwriteReason::ReplaceScheme => {
            format!("Scheme '{name}' already exists in {}.", request.path.display())
        }
        OverwriteReason::ReplaceFile => format!("{} already exists.", request.path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_describe_names_the_target() {
        let request = OverwriteRequest {
            path: Path::new("settings.json").to_path_buf(),
            name: Some("Campbell".to_string()),
            reason: OverwriteReason::ReplaceScheme,
        };
        assert_eq!(describe(&request), "Scheme 'Campbell' already exists in settings.json.");
    }
}
