//! # Themeshift Engine
//!
//! Core library for converting and validating color themes across terminal,
//! terminal-host, Qt stylesheet and widget-toolkit formats. This library
//! provides the canonical data model, format conversion, crash-safe storage
//! with backups, and undo/redo for collection edits.
//!
//! ## Modules
//!
//! - [`color`] - Color values, parsing and contrast math
//! - [`model`] - Canonical record kinds and the theme collection
//! - [`validation`] - Theme name rules
//! - [`converter`] - Rule-based conversion between record kinds
//! - [`host_document`] - Editing `schemes` inside a host settings file
//! - [`stylesheet`] - Palette to Qt stylesheet and back
//! - [`store`] - Loading, saving and scheduled writes
//! - [`backup`] - Backup creation, rotation and restore
//! - [`history`] - Command-based undo/redo
//! - [`common`] - Error types

pub mod backup;
pub mod color;
pub mod common;
pub mod converter;
pub mod history;
pub mod host_document;
pub mod model;
pub mod store;
pub mod stylesheet;
pub mod validation;

pub use backup::BackupManager;
pub use color::ColorValue;
pub use common::{ThemeError, ThemeResult, ValidationError};
pub use converter::{Conversion, DerivationConfig, FormatConverter};
pub use model::{AnyRecord, ThemeKind};
pub use store::{FileFormat, OverwriteConfirmer, ThemeStore};
