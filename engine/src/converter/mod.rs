//! # Format Converter
//!
//! Pure, rule-based mappings between the canonical record kinds. Every
//! conversion is driven by the fixed tables in [`roles`]; the only tunables
//! are the blend ratios in [`DerivationConfig`].
//!
//! Conversions that lose information are total but report which target slots
//! were synthesized rather than copied, through
//! [`Conversion::derived_slots`]. Kinds without a direct rule are converted
//! through [`ThemeRecord`] as the hub (`A → terminal → C`).

pub mod roles;

pub use roles::DerivationConfig;

use crate::color::ColorValue;
use crate::common::errors::ThemeResult;
use crate::model::palette::{PaletteRecord, PaletteSlot};
use crate::model::scheme::EmbeddedSchemeRecord;
use crate::model::terminal::{TerminalSlot, ThemeRecord};
use crate::model::widget::{ColorPair, ConvenienceRole, WidgetThemeRecord};
use crate::model::{AnyRecord, ThemeKind};
use roles::WidgetSlot;
use std::collections::BTreeSet;

/// Name given to terminal themes built from a palette, which has none.
pub const DEFAULT_PALETTE_THEME_NAME: &str = "Converted Palette";

/// A converted record plus the target slots that were synthesized.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion<T> {
    pub record: T,
    pub derived_slots: BTreeSet<String>,
}

impl<T> Conversion<T> {
    pub fn exact(record: T) -> Self {
        Self {
            record,
            derived_slots: BTreeSet::new(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Conversion<U> {
        Conversion {
            record: f(self.record),
            derived_slots: self.derived_slots,
        }
    }

    pub fn is_lossless(&self) -> bool {
        self.derived_slots.is_empty()
    }
}

/// Anchor colors a terminal theme is derived from. `None` falls back to the
/// stock widget theme and is flagged as derived.
#[derive(Debug, Default)]
struct TerminalAnchors {
    background: Option<ColorValue>,
    foreground: Option<ColorValue>,
    blue: Option<ColorValue>,
    cyan: Option<ColorValue>,
    selection: Option<ColorValue>,
    bright_blue: Option<ColorValue>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatConverter {
    config: DerivationConfig,
}

impl FormatConverter {
    pub fn new(config: DerivationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DerivationConfig {
        &self.config
    }

    /// Total: every palette slot has a direct source or a derivation rule.
    pub fn terminal_to_palette(&self, theme: &ThemeRecord) -> PaletteRecord {
        let background = theme.get(TerminalSlot::Background);
        let foreground = theme.get(TerminalSlot::Foreground);

        PaletteRecord::from_fn(|slot| {
            let direct = roles::PALETTE_DIRECT.iter().find(|(target, _)| *target == slot);
            if let Some((_, source)) = direct {
                return theme.get(*source);
            }
            match slot {
                PaletteSlot::Disabled => background.blend(&foreground, self.config.disabled_blend),
                PaletteSlot::Border => background.blend(&foreground, self.config.border_blend),
                // PALETTE_DIRECT covers the rest
                _ => background,
            }
        })
    }

    /// Total but lossy; the 14 slots a palette cannot express are derived.
    pub fn palette_to_terminal(
        &self,
        palette: &PaletteRecord,
        name: &str,
    ) -> Conversion<ThemeRecord> {
        self.derive_terminal(
            name,
            TerminalAnchors {
                background: Some(palette.get(PaletteSlot::Background)),
                foreground: Some(palette.get(PaletteSlot::Foreground)),
                blue: Some(palette.get(PaletteSlot::Primary)),
                cyan: Some(palette.get(PaletteSlot::Secondary)),
                selection: Some(palette.get(PaletteSlot::Selected)),
                bright_blue: Some(palette.get(PaletteSlot::Hover)),
            },
        )
    }

    pub fn terminal_to_windows_scheme(&self, theme: &ThemeRecord) -> EmbeddedSchemeRecord {
        EmbeddedSchemeRecord::from(theme.clone())
    }

    pub fn windows_scheme_to_terminal(&self, scheme: &EmbeddedSchemeRecord) -> ThemeRecord {
        scheme.as_terminal().clone()
    }

    /// Start from the stock widget theme and apply the role table.
    pub fn terminal_to_widget(&self, theme: &ThemeRecord) -> Conversion<WidgetThemeRecord> {
        let mut widget = WidgetThemeRecord::default_theme(theme.name.clone());
        let mut derived = BTreeSet::new();

        for (role, source) in roles::WIDGET_CONVENIENCE {
            let dark = theme.get(source);
            let light = if roles::is_neutral(role) {
                derived.insert(roles::light_variant(role.key()));
                dark.invert()
            } else {
                dark
            };
            widget.apply_convenience_pair(role, light, dark);
        }

        let background = theme.get(TerminalSlot::Background);
        let foreground = theme.get(TerminalSlot::Foreground);
        let extras = [
            (&roles::WIDGET_HOVER, theme.get(TerminalSlot::BrightBlue)),
            (&roles::WIDGET_SELECTED, theme.get(TerminalSlot::Selection)),
            (
                &roles::WIDGET_DISABLED,
                background.blend(&foreground, self.config.disabled_blend),
            ),
            (
                &roles::WIDGET_BORDER,
                background.blend(&foreground, self.config.border_blend),
            ),
        ];
        for (slot, color) in extras {
            write_widget_slot(&mut widget, slot, color);
            // neutral extras are blends, so both variants are synthesized
            if slot.neutral {
                derived.insert(slot.role.to_string());
            }
        }

        Conversion {
            record: widget,
            derived_slots: derived,
        }
    }

    /// Dark variants of the convenience pairs anchor the terminal theme.
    pub fn widget_to_terminal(&self, widget: &WidgetThemeRecord) -> Conversion<ThemeRecord> {
        let pairs = widget.extract_convenience_pairs();
        let dark = |role: ConvenienceRole| pairs.get(role).map(|pair| pair.dark);
        let slot_dark = |slot: &WidgetSlot| {
            widget
                .property(slot.widget, slot.property)
                .and_then(|value| value.as_array())
                .and_then(|items| items.get(1))
                .and_then(|value| value.as_str())
                .and_then(|token| crate::model::widget::resolve_named_color(token).ok())
        };

        self.derive_terminal(
            &widget.name,
            TerminalAnchors {
                background: dark(ConvenienceRole::Background),
                foreground: dark(ConvenienceRole::Text),
                blue: dark(ConvenienceRole::Primary),
                cyan: dark(ConvenienceRole::Secondary),
                selection: slot_dark(&roles::WIDGET_SELECTED),
                bright_blue: slot_dark(&roles::WIDGET_HOVER),
            },
        )
    }

    /// Convert to `target`, composing through the terminal hub when there is
    /// no direct rule. Same-kind conversion is the identity.
    pub fn convert(
        &self,
        record: &AnyRecord,
        target: ThemeKind,
    ) -> ThemeResult<Conversion<AnyRecord>> {
        self.convert_named(record, target, None)
    }

    /// Like [`convert`](Self::convert), naming the result when the source
    /// carries no name (palettes) or when `name` overrides it.
    pub fn convert_named(
        &self,
        record: &AnyRecord,
        target: ThemeKind,
        name: Option<&str>,
    ) -> ThemeResult<Conversion<AnyRecord>> {
        if record.kind() == target {
            let mut same = record.clone();
            if let Some(name) = name {
                rename(&mut same, name);
            }
            return Ok(Conversion::exact(same));
        }

        let hub = self.to_terminal(record, name);
        let mut hub_record = hub.record;
        if let Some(name) = name {
            hub_record.name = name.to_string();
        }

        let mut converted = self.from_terminal(&hub_record, target);
        let carried: Vec<&str> = match target {
            ThemeKind::Terminal | ThemeKind::WindowsScheme => {
                hub.derived_slots.iter().map(String::as_str).collect()
            }
            ThemeKind::Palette => sourced_from(roles::palette_sources(), &hub.derived_slots),
            ThemeKind::Widget => sourced_from(roles::widget_sources(), &hub.derived_slots),
        };
        converted
            .derived_slots
            .extend(carried.into_iter().map(str::to_string));

        log::debug!(
            "Converted {} to {target}: {} derived slot(s)",
            record.kind(),
            converted.derived_slots.len()
        );

        let errors = converted.record.validate();
        if !errors.is_empty() {
            return Err(crate::common::errors::ThemeError::validation(
                format!("converted {target} theme"),
                errors,
            ));
        }
        Ok(converted)
    }

    fn to_terminal(&self, record: &AnyRecord, name: Option<&str>) -> Conversion<ThemeRecord> {
        match record {
            AnyRecord::Terminal(theme) => Conversion::exact(theme.clone()),
            AnyRecord::WindowsScheme(scheme) => {
                Conversion::exact(self.windows_scheme_to_terminal(scheme))
            }
            AnyRecord::Palette(palette) => {
                self.palette_to_terminal(palette, name.unwrap_or(DEFAULT_PALETTE_THEME_NAME))
            }
            AnyRecord::Widget(widget) => self.widget_to_terminal(widget),
        }
    }

    fn from_terminal(&self, theme: &ThemeRecord, target: ThemeKind) -> Conversion<AnyRecord> {
        match target {
            ThemeKind::Terminal => Conversion::exact(AnyRecord::Terminal(theme.clone())),
            ThemeKind::WindowsScheme => {
                Conversion::exact(AnyRecord::WindowsScheme(self.terminal_to_windows_scheme(theme)))
            }
            ThemeKind::Palette => Conversion {
                record: AnyRecord::Palette(self.terminal_to_palette(theme)),
                derived_slots: roles::PALETTE_DERIVED
                    .iter()
                    .map(|slot| slot.key().to_string())
                    .collect(),
            },
            ThemeKind::Widget => self.terminal_to_widget(theme).map(AnyRecord::Widget),
        }
    }

    fn derive_terminal(&self, name: &str, anchors: TerminalAnchors) -> Conversion<ThemeRecord> {
        let stock = WidgetThemeRecord::default_theme("").extract_convenience_pairs();
        let stock_dark = |role: ConvenienceRole, fallback: ColorValue| {
            stock.get(role).map_or(fallback, |pair: ColorPair| pair.dark)
        };

        let mut derived = BTreeSet::new();
        let mut anchor = |slot: TerminalSlot, value: Option<ColorValue>, fallback: ColorValue| {
            value.unwrap_or_else(|| {
                derived.insert(slot.key().to_string());
                fallback
            })
        };

        let background = anchor(
            TerminalSlot::Background,
            anchors.background,
            stock_dark(ConvenienceRole::Background, ColorValue::BLACK),
        );
        let foreground = anchor(
            TerminalSlot::Foreground,
            anchors.foreground,
            stock_dark(ConvenienceRole::Text, ColorValue::WHITE),
        );
        let blue = anchor(
            TerminalSlot::Blue,
            anchors.blue,
            stock_dark(ConvenienceRole::Primary, ColorValue::rgb(0, 0, 0xFF)),
        );
        let cyan = anchor(
            TerminalSlot::Cyan,
            anchors.cyan,
            stock_dark(ConvenienceRole::Secondary, ColorValue::rgb(0, 0xFF, 0xFF)),
        );
        let selection = anchor(
            TerminalSlot::Selection,
            anchors.selection,
            background.blend(&blue, roles::SELECTION_FALLBACK_BLEND),
        );
        let bright_blue = anchor(
            TerminalSlot::BrightBlue,
            anchors.bright_blue,
            blue.blend(&ColorValue::WHITE, self.config.bright_blend),
        );

        let mut theme = ThemeRecord::from_fn(name, |_| background);
        theme.set(TerminalSlot::Foreground, foreground);
        theme.set(TerminalSlot::Blue, blue);
        theme.set(TerminalSlot::Cyan, cyan);
        theme.set(TerminalSlot::Selection, selection);
        theme.set(TerminalSlot::BrightBlue, bright_blue);

        let mut synthesize = |slot: TerminalSlot, color: ColorValue| {
            theme.set(slot, color);
            derived.insert(slot.key().to_string());
        };

        synthesize(TerminalSlot::Cursor, foreground);
        synthesize(TerminalSlot::Black, background);
        synthesize(TerminalSlot::White, foreground);
        for (slot, ratio) in roles::NEUTRAL_RAMP {
            synthesize(slot, background.blend(&foreground, ratio));
        }

        for base in TerminalSlot::ANSI {
            let Some(bright) = base.bright() else { continue };
            if bright == TerminalSlot::BrightBlue {
                continue;
            }
            let source = match base {
                TerminalSlot::Black => background,
                TerminalSlot::White => foreground,
                TerminalSlot::Blue => blue,
                TerminalSlot::Cyan => cyan,
                _ => background.blend(
                    &foreground,
                    roles::NEUTRAL_RAMP
                        .iter()
                        .find(|(slot, _)| *slot == base)
                        .map_or(0.5, |(_, ratio)| *ratio),
                ),
            };
            synthesize(bright, source.blend(&ColorValue::WHITE, self.config.bright_blend));
        }

        Conversion {
            record: theme,
            derived_slots: derived,
        }
    }
}

fn write_widget_slot(widget: &mut WidgetThemeRecord, slot: &WidgetSlot, dark: ColorValue) {
    let light = if slot.neutral { dark.invert() } else { dark };
    widget.set_property(slot.widget, slot.property, ColorPair::new(light, dark).to_json());
}

fn sourced_from<'a>(
    sources: impl Iterator<Item = (&'static str, TerminalSlot)>,
    hub_derived: &BTreeSet<String>,
) -> Vec<&'a str> {
    sources
        .filter(|(_, source)| hub_derived.contains(source.key()))
        .map(|(target, _)| target)
        .collect()
}

fn rename(record: &mut AnyRecord, name: &str) {
    match record {
        AnyRecord::Terminal(theme) => theme.name = name.to_string(),
        AnyRecord::WindowsScheme(scheme) => {
            let mut theme = scheme.as_terminal().clone();
            theme.name = name.to_string();
            *scheme = EmbeddedSchemeRecord::from(theme);
        }
        AnyRecord::Palette(_) => {}
        AnyRecord::Widget(widget) => widget.name = name.to_string(),
    }
}
