use crate::color::ColorValue;
use crate::common::errors::{ThemeError, ThemeResult, ValidationError};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// The 8 roles of a stylesheet palette, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaletteSlot {
    Background,
    Foreground,
    Primary,
    Secondary,
    Border,
    Hover,
    Selected,
    Disabled,
}

impl PaletteSlot {
    pub const COUNT: usize = 8;

    pub const ALL: [PaletteSlot; Self::COUNT] = [
        PaletteSlot::Background,
        PaletteSlot::Foreground,
        PaletteSlot::Primary,
        PaletteSlot::Secondary,
        PaletteSlot::Border,
        PaletteSlot::Hover,
        PaletteSlot::Selected,
        PaletteSlot::Disabled,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PaletteSlot::Background => "background",
            PaletteSlot::Foreground => "foreground",
            PaletteSlot::Primary => "primary",
            PaletteSlot::Secondary => "secondary",
            PaletteSlot::Border => "border",
            PaletteSlot::Hover => "hover",
            PaletteSlot::Selected => "selected",
            PaletteSlot::Disabled => "disabled",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

/// Named starting palettes offered by the stylesheet editor.
pub const PRESET_NAMES: [&str; 5] = [
    "Default",
    "Material Dark",
    "Material Light",
    "Flat Dark",
    "Flat Light",
];

/// A stylesheet color palette. One palette is one file; there is no name and
/// no collection wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteRecord {
    colors: [ColorValue; PaletteSlot::COUNT],
}

impl Default for PaletteRecord {
    fn default() -> Self {
        Self::from_hex_table([
            0xFFFFFF, 0x000000, 0x0078D4, 0x6C757D, 0xCCCCCC, 0xE5E5E5, 0x0078D4, 0x999999,
        ])
    }
}

impl PaletteRecord {
    pub fn from_fn(mut color_for: impl FnMut(PaletteSlot) -> ColorValue) -> Self {
        Self {
            colors: PaletteSlot::ALL.map(|slot| color_for(slot).opaque()),
        }
    }

    fn from_hex_table(table: [u32; PaletteSlot::COUNT]) -> Self {
        Self {
            colors: table.map(|rgb| {
                let [_, r, g, b] = rgb.to_be_bytes();
                ColorValue::rgb(r, g, b)
            }),
        }
    }

    /// Look up one of [`PRESET_NAMES`].
    pub fn preset(name: &str) -> Option<Self> {
        let table = match name {
            "Default" => return Some(Self::default()),
            "Material Dark" => [
                0x1E1E1E, 0xFFFFFF, 0xBB86FC, 0x03DAC6, 0x3C3C3C, 0x2D2D2D, 0xBB86FC, 0x666666,
            ],
            "Material Light" => [
                0xFAFAFA, 0x212121, 0x6200EE, 0x03DAC6, 0xE0E0E0, 0xF5F5F5, 0x6200EE, 0xBDBDBD,
            ],
            "Flat Dark" => [
                0x2C3E50, 0xECF0F1, 0x3498DB, 0x2ECC71, 0x34495E, 0x34495E, 0x3498DB, 0x7F8C8D,
            ],
            "Flat Light" => [
                0xECF0F1, 0x2C3E50, 0x3498DB, 0x2ECC71, 0xBDC3C7, 0xE0E0E0, 0x3498DB, 0x95A5A6,
            ],
            _ => return None,
        };
        Some(Self::from_hex_table(table))
    }

    pub fn get(&self, slot: PaletteSlot) -> ColorValue {
        self.colors[slot as usize]
    }

    pub fn set(&mut self, slot: PaletteSlot, color: ColorValue) -> ColorValue {
        std::mem::replace(&mut self.colors[slot as usize], color.opaque())
    }

    pub fn iter(&self) -> impl Iterator<Item = (PaletteSlot, ColorValue)> + '_ {
        PaletteSlot::ALL.iter().map(|slot| (*slot, self.get(*slot)))
    }

    pub fn has_low_contrast(&self) -> bool {
        self.get(PaletteSlot::Foreground)
            .is_low_contrast(&self.get(PaletteSlot::Background))
    }

    /// Parse a palette object, reporting every missing or malformed slot.
    pub fn from_json(value: &Value) -> Result<Self, Vec<ValidationError>> {
        let Some(object) = value.as_object() else {
            return Err(vec![ValidationError::invalid_format(value.to_string())]);
        };

        let mut colors = [ColorValue::BLACK; PaletteSlot::COUNT];
        let mut errors = Vec::new();
        for slot in PaletteSlot::ALL {
            let parsed = match object.get(slot.key()) {
                None => Err(ValidationError::missing_slot(slot.key())),
                Some(Value::String(text)) => {
                    ColorValue::parse(text).map_err(|e| e.with_slot(slot.key()))
                }
                Some(other) => {
                    Err(ValidationError::invalid_format(other.to_string()).with_slot(slot.key()))
                }
            };
            match parsed {
                Ok(color) => colors[slot as usize] = color.opaque(),
                Err(error) => errors.push(error),
            }
        }

        if errors.is_empty() {
            Ok(Self { colors })
        } else {
            Err(errors)
        }
    }

    pub fn load(bytes: &[u8]) -> ThemeResult<Self> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| ThemeError::parse("palette", e))?;
        Self::from_json(&value).map_err(|errors| ThemeError::validation("palette", errors))
    }

    pub fn serialize(&self) -> ThemeResult<Vec<u8>> {
        let mut bytes =
            serde_json::to_vec_pretty(self).map_err(|e| ThemeError::parse("palette", e))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

impl Serialize for PaletteRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(PaletteSlot::COUNT))?;
        for (slot, color) in self.iter() {
            map.serialize_entry(slot.key(), &color.to_hex(false))?;
        }
        map.end()
    }
}
