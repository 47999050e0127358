//! Fixed role tables and derivation constants used by the converter.

use crate::model::palette::PaletteSlot;
use crate::model::terminal::TerminalSlot;
use crate::model::widget::ConvenienceRole;

/// Blend ratios for slots that have no direct source.
///
/// Each ratio is the position between the two anchors, `0.0` being the first
/// anchor and `1.0` the second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivationConfig {
    /// `disabled` = background blended toward foreground.
    pub disabled_blend: f64,
    /// `border` = background blended toward foreground.
    pub border_blend: f64,
    /// `bright*` = base color blended toward white.
    pub bright_blend: f64,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            disabled_blend: 0.40,
            border_blend: 0.20,
            bright_blend: 0.25,
        }
    }
}

/// Terminal → palette slots copied without derivation.
pub const PALETTE_DIRECT: [(PaletteSlot, TerminalSlot); 6] = [
    (PaletteSlot::Background, TerminalSlot::Background),
    (PaletteSlot::Foreground, TerminalSlot::Foreground),
    (PaletteSlot::Primary, TerminalSlot::Blue),
    (PaletteSlot::Secondary, TerminalSlot::Cyan),
    (PaletteSlot::Hover, TerminalSlot::BrightBlue),
    (PaletteSlot::Selected, TerminalSlot::Selection),
];

/// Palette slots that are always synthesized from background and foreground.
pub const PALETTE_DERIVED: [PaletteSlot; 2] = [PaletteSlot::Disabled, PaletteSlot::Border];

/// Gray ramp between background and foreground for the ANSI colors a palette
/// cannot express.
pub const NEUTRAL_RAMP: [(TerminalSlot, f64); 4] = [
    (TerminalSlot::Red, 0.35),
    (TerminalSlot::Green, 0.50),
    (TerminalSlot::Yellow, 0.65),
    (TerminalSlot::Purple, 0.80),
];

/// Ratio between background and blue used for a missing selection color.
pub const SELECTION_FALLBACK_BLEND: f64 = 0.50;

/// Convenience roles and the terminal slot feeding their dark variant.
pub const WIDGET_CONVENIENCE: [(ConvenienceRole, TerminalSlot); 4] = [
    (ConvenienceRole::Background, TerminalSlot::Background),
    (ConvenienceRole::Text, TerminalSlot::Foreground),
    (ConvenienceRole::Primary, TerminalSlot::Blue),
    (ConvenienceRole::Secondary, TerminalSlot::Cyan),
];

/// Convenience roles whose light variant is the inversion of the dark one.
/// Accent roles use the same color in both modes.
pub fn is_neutral(role: ConvenienceRole) -> bool {
    matches!(role, ConvenienceRole::Background | ConvenienceRole::Text)
}

/// Widget slots for the palette roles outside the convenience set.
pub struct WidgetSlot {
    pub role: &'static str,
    pub widget: &'static str,
    pub property: &'static str,
    /// Written as `[invert(c), c]` when true, `[c, c]` otherwise.
    pub neutral: bool,
}

pub const WIDGET_HOVER: WidgetSlot = WidgetSlot {
    role: "hover",
    widget: "CTkSegmentedButton",
    property: "unselected_hover_color",
    neutral: false,
};

pub const WIDGET_SELECTED: WidgetSlot = WidgetSlot {
    role: "selected",
    widget: "CTkSegmentedButton",
    property: "selected_color",
    neutral: false,
};

pub const WIDGET_DISABLED: WidgetSlot = WidgetSlot {
    role: "disabled",
    widget: "CTkButton",
    property: "text_color_disabled",
    neutral: true,
};

pub const WIDGET_BORDER: WidgetSlot = WidgetSlot {
    role: "border",
    widget: "CTkEntry",
    property: "border_color",
    neutral: true,
};

/// Name of a target slot in a widget theme, as reported in derived sets.
pub fn light_variant(role: &str) -> String {
    format!("{role}[light]")
}

/// Target slot names fed directly by a terminal slot, per target kind.
/// Used to carry "derived" flags across a hub conversion.
pub fn palette_sources() -> impl Iterator<Item = (&'static str, TerminalSlot)> {
    PALETTE_DIRECT.into_iter().map(|(slot, source)| (slot.key(), source))
}

pub fn widget_sources() -> impl Iterator<Item = (&'static str, TerminalSlot)> {
    WIDGET_CONVENIENCE
        .into_iter()
        .map(|(role, source)| (role.key(), source))
        .chain([
            (WIDGET_HOVER.role, TerminalSlot::BrightBlue),
            (WIDGET_SELECTED.role, TerminalSlot::Selection),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ratios() {
        let config = DerivationConfig::default();
        assert_eq!(config.disabled_blend, 0.40);
        assert_eq!(config.border_blend, 0.20);
        assert_eq!(config.bright_blend, 0.25);
    }

    #[test]
    fn test_every_palette_slot_has_a_rule() {
        for slot in PaletteSlot::ALL {
            let direct = PALETTE_DIRECT.iter().any(|(target, _)| *target == slot);
            let derived = PALETTE_DERIVED.contains(&slot);
            assert!(direct ^ derived, "{slot:?} must be exactly one of direct/derived");
        }
    }
}
