//! Canonical theme records, one per supported on-disk schema.
//!
//! Every format is normalized into one of these types on load. The closed
//! [`AnyRecord`] set is what the converter and the store dispatch on.

pub mod palette;
pub mod scheme;
pub mod terminal;
pub mod widget;

pub use palette::{PaletteRecord, PaletteSlot};
pub use scheme::EmbeddedSchemeRecord;
pub use terminal::{RawThemeRecord, TerminalSlot, ThemeCollection, ThemeRecord};
pub use widget::{ColorPair, ConveniencePairs, ConvenienceRole, WidgetThemeRecord};

use crate::common::errors::ValidationError;
use std::fmt;
use std::str::FromStr;

/// Discriminant of [`AnyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeKind {
    Terminal,
    WindowsScheme,
    Palette,
    Widget,
}

impl ThemeKind {
    pub const ALL: [ThemeKind; 4] = [
        ThemeKind::Terminal,
        ThemeKind::WindowsScheme,
        ThemeKind::Palette,
        ThemeKind::Widget,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeKind::Terminal => "terminal",
            ThemeKind::WindowsScheme => "windows-scheme",
            ThemeKind::Palette => "palette",
            ThemeKind::Widget => "widget",
        }
    }
}

impl fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown theme kind '{s}'"))
    }
}

/// Any canonical record.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyRecord {
    Terminal(ThemeRecord),
    WindowsScheme(EmbeddedSchemeRecord),
    Palette(PaletteRecord),
    Widget(WidgetThemeRecord),
}

impl AnyRecord {
    pub fn kind(&self) -> ThemeKind {
        match self {
            AnyRecord::Terminal(_) => ThemeKind::Terminal,
            AnyRecord::WindowsScheme(_) => ThemeKind::WindowsScheme,
            AnyRecord::Palette(_) => ThemeKind::Palette,
            AnyRecord::Widget(_) => ThemeKind::Widget,
        }
    }

    /// Palettes carry no name.
    pub fn name(&self) -> Option<&str> {
        match self {
            AnyRecord::Terminal(record) => Some(&record.name),
            AnyRecord::WindowsScheme(record) => Some(record.name()),
            AnyRecord::Palette(_) => None,
            AnyRecord::Widget(record) => Some(&record.name),
        }
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        match self {
            AnyRecord::Terminal(record) => record.validate(),
            AnyRecord::WindowsScheme(record) => record.validate(),
            AnyRecord::Palette(_) => Vec::new(),
            AnyRecord::Widget(record) => record.validate(),
        }
    }

    /// Whether the main text/background pair falls below WCAG AA.
    pub fn has_low_contrast(&self) -> bool {
        match self {
            AnyRecord::Terminal(record) => record.has_low_contrast(),
            AnyRecord::WindowsScheme(record) => record.as_terminal().has_low_contrast(),
            AnyRecord::Palette(record) => record.has_low_contrast(),
            AnyRecord::Widget(record) => {
                let pairs = record.extract_convenience_pairs();
                match (pairs.text, pairs.background) {
                    (Some(text), Some(background)) => text.dark.is_low_contrast(&background.dark),
                    _ => false,
                }
            }
        }
    }
}

impl From<ThemeRecord> for AnyRecord {
    fn from(record: ThemeRecord) -> Self {
        AnyRecord::Terminal(record)
    }
}

impl From<EmbeddedSchemeRecord> for AnyRecord {
    fn from(record: EmbeddedSchemeRecord) -> Self {
        AnyRecord::WindowsScheme(record)
    }
}

impl From<PaletteRecord> for AnyRecord {
    fn from(record: PaletteRecord) -> Self {
        AnyRecord::Palette(record)
    }
}

impl From<WidgetThemeRecord> for AnyRecord {
    fn from(record: WidgetThemeRecord) -> Self {
        AnyRecord::Widget(record)
    }
}
