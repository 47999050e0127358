use crate::config::validation::validate_log_level;
use crate::convert::{ConvertRequest, ConvertSource};
use crate::error::{AppError, AppResult};
use clap::Parser;
use engine::store::FileFormat;
use std::path::{Path, PathBuf};

/// Convert a theme between terminal, terminal-host, Qt stylesheet and
/// widget-toolkit formats.
#[derive(Debug, Parser)]
#[command(name = "themeshift", author, version, about, long_about = None)]
pub struct Cli {
    /// Source file; defaults to the theme collection for `terminal`
    #[arg(long = "in", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Source format: terminal, windows-terminal, palette, stylesheet, widget
    #[arg(long = "in-format", value_name = "KIND", required_unless_present = "preset")]
    pub input_format: Option<FileFormat>,

    /// Start from a built-in palette instead of a file
    #[arg(
        long,
        value_name = "NAME",
        conflicts_with_all = ["input", "input_format", "theme"]
    )]
    pub preset: Option<String>,

    /// Target file; defaults to the theme collection for `terminal`
    #[arg(long = "out", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Target format: terminal, windows-terminal, palette, stylesheet, widget
    #[arg(long = "out-format", value_name = "KIND")]
    pub output_format: FileFormat,

    /// Theme to read from a collection or host document (default: first)
    #[arg(long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Name of the converted theme
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Replace existing themes and files without asking
    #[arg(long)]
    pub force: bool,

    /// Configuration file (default: ~/.config/themeshift/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long = "log-level", value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<String>,
}

fn parse_log_level(level: &str) -> Result<String, String> {
    validate_log_level(level)
        .map(|()| level.to_lowercase())
        .map_err(|e| e.user_message())
}

impl Cli {
    /// Resolve paths; only the `terminal` format may omit one.
    pub fn to_request(&self, default_collection: &Path) -> AppResult<ConvertRequest> {
        let source = match (&self.preset, self.input_format) {
            (Some(preset), _) => ConvertSource::Preset(preset.clone()),
            (None, Some(format)) => ConvertSource::File {
                path: resolve(self.input.as_deref(), format, default_collection, "--in")?,
                format,
                theme: self.theme.clone(),
            },
            (None, None) => {
                return Err(AppError::Usage("--in-format or --preset is required".to_string()));
            }
        };

        Ok(ConvertRequest {
            source,
            output: resolve(
                self.output.as_deref(),
                self.output_format,
                default_collection,
                "--out",
            )?,
            output_format: self.output_format,
            name: self.name.clone(),
        })
    }
}

fn resolve(
    path: Option<&Path>,
    format: FileFormat,
    default_collection: &Path,
    flag: &str,
) -> AppResult<PathBuf> {
    match (path, format) {
        (Some(path), _) => Ok(path.to_path_buf()),
        (None, FileFormat::Collection) => Ok(default_collection.to_path_buf()),
        (None, _) => Err(AppError::Usage(format!("{flag} is required for the {format} format"))),
    }
}
