//! Rendering a palette to a Qt stylesheet and reading one back.
//!
//! Extraction is not a CSS parser. It scans `selector { declarations }`
//! blocks and looks up a fixed set of known declarations; anything it cannot
//! find keeps the default palette value and is reported.

use crate::color::ColorValue;
use crate::converter::Conversion;
use crate::model::palette::{PaletteRecord, PaletteSlot};
use std::collections::BTreeSet;

/// Render the stock stylesheet template with `palette` substituted.
pub fn render_stylesheet(palette: &PaletteRecord) -> String {
    let c = |slot: PaletteSlot| palette.get(slot).to_hex(false);
    let background = c(PaletteSlot::Background);
    let foreground = c(PaletteSlot::Foreground);
    let primary = c(PaletteSlot::Primary);
    let secondary = c(PaletteSlot::Secondary);
    let border = c(PaletteSlot::Border);
    let hover = c(PaletteSlot::Hover);
    let selected = c(PaletteSlot::Selected);
    let disabled = c(PaletteSlot::Disabled);

    format!(
        r#"/* Generated QSS Theme */

/* Main Window and Widgets */
QWidget {{
    background-color: {background};
    color: {foreground};
    font-size: 10pt;
}}

/* Buttons */
QPushButton {{
    background-color: {primary};
    color: {background};
    border: 1px solid {border};
    border-radius: 4px;
    padding: 5px 15px;
    min-width: 80px;
}}

QPushButton:hover {{
    background-color: {hover};
    color: {foreground};
}}

QPushButton:pressed {{
    background-color: {selected};
    color: {background};
}}

QPushButton:checked {{
    background-color: {secondary};
    color: {background};
}}

QPushButton:disabled {{
    background-color: {disabled};
    color: {border};
}}

/* Input Fields */
QLineEdit, QTextEdit, QPlainTextEdit {{
    background-color: {background};
    color: {foreground};
    border: 1px solid {border};
    border-radius: 3px;
    padding: 4px;
}}

QLineEdit:focus, QTextEdit:focus, QPlainTextEdit:focus {{
    border: 2px solid {primary};
}}

/* ComboBox */
QComboBox {{
    background-color: {background};
    color: {foreground};
    border: 1px solid {border};
    border-radius: 3px;
    padding: 4px;
}}

QComboBox:hover {{
    border: 1px solid {primary};
}}

QComboBox::drop-down {{
    border: none;
}}

QComboBox QAbstractItemView {{
    background-color: {background};
    color: {foreground};
    selection-background-color: {selected};
    selection-color: {background};
}}

/* CheckBox and RadioButton */
QCheckBox, QRadioButton {{
    color: {foreground};
    spacing: 5px;
}}

QCheckBox::indicator, QRadioButton::indicator {{
    width: 16px;
    height: 16px;
    border: 1px solid {border};
    background-color: {background};
}}

QCheckBox::indicator:checked, QRadioButton::indicator:checked {{
    background-color: {primary};
}}

/* ProgressBar */
QProgressBar {{
    background-color: {background};
    border: 1px solid {border};
    border-radius: 3px;
    text-align: center;
}}

QProgressBar::chunk {{
    background-color: {primary};
    border-radius: 2px;
}}

/* List, Tree, Table */
QListWidget, QTreeWidget, QTableWidget {{
    background-color: {background};
    color: {foreground};
    border: 1px solid {border};
    alternate-background-color: {hover};
}}

QListWidget::item:selected, QTreeWidget::item:selected, QTableWidget::item:selected {{
    background-color: {selected};
    color: {background};
}}

/* TabWidget */
QTabWidget::pane {{
    border: 1px solid {border};
    background-color: {background};
}}

QTabBar::tab {{
    background-color: {hover};
    color: {foreground};
    border: 1px solid {border};
    padding: 6px 12px;
}}

QTabBar::tab:selected {{
    background-color: {primary};
    color: {background};
}}

/* Menu */
QMenu {{
    background-color: {background};
    color: {foreground};
    border: 1px solid {border};
}}

QMenu::item:selected {{
    background-color: {selected};
    color: {background};
}}

/* ScrollBar */
QScrollBar:vertical {{
    background: {background};
    width: 12px;
    border: 1px solid {border};
}}

QScrollBar::handle:vertical {{
    background: {primary};
    min-height: 20px;
    border-radius: 4px;
}}
"#
    )
}

/// How a selector is matched against one entry of a block's selector list.
#[derive(Debug, Clone, Copy)]
enum SelectorMatch {
    Exact(&'static str),
    EndsWith(&'static str),
    Contains(&'static str),
}

impl SelectorMatch {
    fn matches(self, selector: &str) -> bool {
        match self {
            SelectorMatch::Exact(text) => selector == text,
            SelectorMatch::EndsWith(text) => selector.ends_with(text),
            SelectorMatch::Contains(text) => selector.contains(text),
        }
    }
}

/// Known declarations, first match in document order wins.
const DECLARATIONS: [(PaletteSlot, SelectorMatch, &str); 7] = [
    (PaletteSlot::Background, SelectorMatch::Exact("QWidget"), "background-color"),
    (PaletteSlot::Foreground, SelectorMatch::Exact("QWidget"), "color"),
    (PaletteSlot::Primary, SelectorMatch::Exact("QPushButton"), "background-color"),
    (PaletteSlot::Secondary, SelectorMatch::EndsWith(":checked"), "background-color"),
    (PaletteSlot::Hover, SelectorMatch::EndsWith(":hover"), "background-color"),
    (PaletteSlot::Selected, SelectorMatch::Contains("::item:selected"), "background-color"),
    (PaletteSlot::Disabled, SelectorMatch::EndsWith(":disabled"), "background-color"),
];

struct Block<'a> {
    selectors: Vec<&'a str>,
    declarations: Vec<(String, &'a str)>,
}

/// Pull a palette out of stylesheet text.
///
/// The border color is the first color found in any `border*` declaration.
/// `derived_slots` lists the slots that kept their default value.
pub fn extract_palette(qss: &str) -> Conversion<PaletteRecord> {
    let text = strip_comments(qss);
    let blocks = scan_blocks(&text);
    let mut palette = PaletteRecord::default();
    let mut defaulted: BTreeSet<String> =
        PaletteSlot::ALL.iter().map(|s| s.key().to_string()).collect();

    for (slot, selector, property) in DECLARATIONS {
        let found = blocks
            .iter()
            .filter(|block| block.selectors.iter().any(|s| selector.matches(s)))
            .flat_map(|block| block.declarations.iter())
            .filter(|(name, _)| name == property)
            .find_map(|(_, value)| find_color(value));
        if let Some(color) = found {
            palette.set(slot, color);
            defaulted.remove(slot.key());
        }
    }

    let border = blocks
        .iter()
        .flat_map(|block| block.declarations.iter())
        .filter(|(name, _)| name.starts_with("border"))
        .find_map(|(_, value)| find_color(value));
    if let Some(color) = border {
        palette.set(PaletteSlot::Border, color);
        defaulted.remove(PaletteSlot::Border.key());
    }

    if !defaulted.is_empty() {
        log::debug!("Stylesheet extraction kept defaults for: {defaulted:?}");
    }

    Conversion {
        record: palette,
        derived_slots: defaulted,
    }
}

fn strip_comments(qss: &str) -> String {
    let mut output = String::with_capacity(qss.len());
    let mut rest = qss;
    while let Some(start) = rest.find("/*") {
        output.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => rest = "",
        }
    }
    output.push_str(rest);
    output
}

fn scan_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };

        let selectors = rest[..open]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        let declarations = rest[open + 1..close]
            .split(';')
            .filter_map(|declaration| {
                let (name, value) = declaration.split_once(':')?;
                Some((name.trim().to_ascii_lowercase(), value.trim()))
            })
            .collect();

        blocks.push(Block {
            selectors,
            declarations,
        });
        rest = &rest[close + 1..];
    }

    blocks
}

/// First color token in a declaration value (`1px solid #CCCCCC`).
fn find_color(value: &str) -> Option<ColorValue> {
    let lower = value.to_ascii_lowercase();
    if let Some(start) = lower.find("rgb(") {
        let end = lower[start..].find(')')? + start;
        return ColorValue::parse(&value[start..=end]).ok();
    }

    value
        .split_whitespace()
        .filter(|word| word.starts_with('#'))
        .find_map(|word| ColorValue::parse(word).ok())
}
