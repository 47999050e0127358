use crate::color::ColorValue;
use crate::common::errors::{ThemeError, ThemeResult, ValidationError, ValidationErrorKind};
use crate::validation::{ThemeNameValidator, Validator};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// The 20 color roles of a terminal color scheme, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TerminalSlot {
    Background,
    Foreground,
    Cursor,
    Selection,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Purple,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightPurple,
    BrightCyan,
    BrightWhite,
}

impl TerminalSlot {
    pub const COUNT: usize = 20;

    pub const ALL: [TerminalSlot; Self::COUNT] = [
        TerminalSlot::Background,
        TerminalSlot::Foreground,
        TerminalSlot::Cursor,
        TerminalSlot::Selection,
        TerminalSlot::Black,
        TerminalSlot::Red,
        TerminalSlot::Green,
        TerminalSlot::Yellow,
        TerminalSlot::Blue,
        TerminalSlot::Purple,
        TerminalSlot::Cyan,
        TerminalSlot::White,
        TerminalSlot::BrightBlack,
        TerminalSlot::BrightRed,
        TerminalSlot::BrightGreen,
        TerminalSlot::BrightYellow,
        TerminalSlot::BrightBlue,
        TerminalSlot::BrightPurple,
        TerminalSlot::BrightCyan,
        TerminalSlot::BrightWhite,
    ];

    /// The eight base ANSI roles, in ANSI index order.
    pub const ANSI: [TerminalSlot; 8] = [
        TerminalSlot::Black,
        TerminalSlot::Red,
        TerminalSlot::Green,
        TerminalSlot::Yellow,
        TerminalSlot::Blue,
        TerminalSlot::Purple,
        TerminalSlot::Cyan,
        TerminalSlot::White,
    ];

    /// JSON key used by collection files.
    pub fn key(self) -> &'static str {
        match self {
            TerminalSlot::Background => "background",
            TerminalSlot::Foreground => "foreground",
            TerminalSlot::Cursor => "cursor",
            TerminalSlot::Selection => "selection",
            TerminalSlot::Black => "black",
            TerminalSlot::Red => "red",
            TerminalSlot::Green => "green",
            TerminalSlot::Yellow => "yellow",
            TerminalSlot::Blue => "blue",
            TerminalSlot::Purple => "purple",
            TerminalSlot::Cyan => "cyan",
            TerminalSlot::White => "white",
            TerminalSlot::BrightBlack => "brightBlack",
            TerminalSlot::BrightRed => "brightRed",
            TerminalSlot::BrightGreen => "brightGreen",
            TerminalSlot::BrightYellow => "brightYellow",
            TerminalSlot::BrightBlue => "brightBlue",
            TerminalSlot::BrightPurple => "brightPurple",
            TerminalSlot::BrightCyan => "brightCyan",
            TerminalSlot::BrightWhite => "brightWhite",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }

    /// The bright counterpart of a base ANSI role.
    pub fn bright(self) -> Option<Self> {
        let bright = match self {
            TerminalSlot::Black => TerminalSlot::BrightBlack,
            TerminalSlot::Red => TerminalSlot::BrightRed,
            TerminalSlot::Green => TerminalSlot::BrightGreen,
            TerminalSlot::Yellow => TerminalSlot::BrightYellow,
            TerminalSlot::Blue => TerminalSlot::BrightBlue,
            TerminalSlot::Purple => TerminalSlot::BrightPurple,
            TerminalSlot::Cyan => TerminalSlot::BrightCyan,
            TerminalSlot::White => TerminalSlot::BrightWhite,
            _ => return None,
        };
        Some(bright)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A terminal color scheme: a name plus all 20 mandatory color slots.
///
/// A `ThemeRecord` is valid by construction for its colors; building one
/// from untrusted JSON goes through [`RawThemeRecord`], which reports every
/// missing or malformed slot at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRecord {
    pub name: String,
    colors: [ColorValue; TerminalSlot::COUNT],
}

impl ThemeRecord {
    pub fn new(name: impl Into<String>, colors: [ColorValue; TerminalSlot::COUNT]) -> Self {
        Self {
            name: name.into(),
            colors: colors.map(|c| c.opaque()),
        }
    }

    pub fn from_fn(
        name: impl Into<String>,
        mut color_for: impl FnMut(TerminalSlot) -> ColorValue,
    ) -> Self {
        let colors = TerminalSlot::ALL.map(|slot| color_for(slot).opaque());
        Self {
            name: name.into(),
            colors,
        }
    }

    /// The starting point for a "new theme" action.
    pub fn default_dark(name: impl Into<String>) -> Self {
        Self::from_fn(name, |slot| {
            let (r, g, b) = match slot {
                TerminalSlot::Background | TerminalSlot::Black => (0x00, 0x00, 0x00),
                TerminalSlot::Foreground
                | TerminalSlot::Cursor
                | TerminalSlot::Selection
                | TerminalSlot::White
                | TerminalSlot::BrightWhite => (0xFF, 0xFF, 0xFF),
                TerminalSlot::Red => (0xFF, 0x00, 0x00),
                TerminalSlot::Green => (0x00, 0xFF, 0x00),
                TerminalSlot::Yellow => (0xFF, 0xFF, 0x00),
                TerminalSlot::Blue => (0x00, 0x00, 0xFF),
                TerminalSlot::Purple => (0xFF, 0x00, 0xFF),
                TerminalSlot::Cyan => (0x00, 0xFF, 0xFF),
                TerminalSlot::BrightBlack => (0x80, 0x80, 0x80),
                TerminalSlot::BrightRed => (0xFF, 0x80, 0x80),
                TerminalSlot::BrightGreen => (0x80, 0xFF, 0x80),
                TerminalSlot::BrightYellow => (0xFF, 0xFF, 0x80),
                TerminalSlot::BrightBlue => (0x80, 0x80, 0xFF),
                TerminalSlot::BrightPurple => (0xFF, 0x80, 0xFF),
                TerminalSlot::BrightCyan => (0x80, 0xFF, 0xFF),
            };
            ColorValue::rgb(r, g, b)
        })
    }

    /// Black everywhere except readable text and cursor.
    pub fn blank(name: impl Into<String>) -> Self {
        Self::from_fn(name, |slot| match slot {
            TerminalSlot::Foreground | TerminalSlot::Cursor => ColorValue::WHITE,
            _ => ColorValue::BLACK,
        })
    }

    pub fn get(&self, slot: TerminalSlot) -> ColorValue {
        self.colors[slot.index()]
    }

    pub fn set(&mut self, slot: TerminalSlot, color: ColorValue) -> ColorValue {
        std::mem::replace(&mut self.colors[slot.index()], color.opaque())
    }

    pub fn iter(&self) -> impl Iterator<Item = (TerminalSlot, ColorValue)> + '_ {
        TerminalSlot::ALL.iter().map(|slot| (*slot, self.get(*slot)))
    }

    /// Colors are valid by construction, so only the name can be wrong.
    pub fn validate(&self) -> Vec<ValidationError> {
        ThemeNameValidator.validate(&self.name).err().into_iter().collect()
    }

    /// Whether foreground on background falls below WCAG AA.
    pub fn has_low_contrast(&self) -> bool {
        self.get(TerminalSlot::Foreground)
            .is_low_contrast(&self.get(TerminalSlot::Background))
    }

    /// Parse a single theme object, reporting every slot problem at once.
    pub fn from_json(value: &Value, fallback_name: &str) -> Result<Self, Vec<ValidationError>> {
        RawThemeRecord::from_json(value)?.into_record(fallback_name)
    }

    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("name".to_string(), Value::String(self.name.clone()));
        for (slot, color) in self.iter() {
            map.insert(slot.key().to_string(), Value::String(color.to_hex(false)));
        }
        Value::Object(map)
    }
}

impl Serialize for ThemeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(TerminalSlot::COUNT + 1))?;
        map.serialize_entry("name", &self.name)?;
        for (slot, color) in self.iter() {
            map.serialize_entry(slot.key(), &color.to_hex(false))?;
        }
        map.end()
    }
}

/// A theme object as read from disk, before slot validation.
#[derive(Debug, Clone, Default)]
pub struct RawThemeRecord {
    pub name: Option<String>,
    pub values: IndexMap<String, Value>,
}

impl RawThemeRecord {
    pub fn from_json(value: &Value) -> Result<Self, Vec<ValidationError>> {
        let Some(object) = value.as_object() else {
            return Err(vec![ValidationError::invalid_format(value.to_string())]);
        };

        let mut raw = RawThemeRecord::default();
        for (key, value) in object {
            if key == "name" {
                raw.name = value.as_str().map(str::to_string);
            } else {
                raw.values.insert(key.clone(), value.clone());
            }
        }
        Ok(raw)
    }

    /// Resolve a slot, accepting alternative keys in priority order.
    pub(crate) fn lookup(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|key| self.values.get(*key))
    }

    /// One error per missing or malformed slot; never stops early.
    pub fn validate(&self) -> Vec<ValidationError> {
        self.validate_with(|slot| vec![slot.key()])
    }

    pub(crate) fn validate_with(
        &self,
        keys_for: impl Fn(TerminalSlot) -> Vec<&'static str>,
    ) -> Vec<ValidationError> {
        TerminalSlot::ALL
            .iter()
            .filter_map(|slot| self.parse_slot(*slot, &keys_for(*slot)).err())
            .collect()
    }

    fn parse_slot(&self, slot: TerminalSlot, keys: &[&str]) -> Result<ColorValue, ValidationError> {
        match self.lookup(keys) {
            None => Err(ValidationError::missing_slot(slot.key())),
            Some(Value::String(text)) => ColorValue::parse(text)
                .map(|c| c.opaque())
                .map_err(|e| e.with_slot(slot.key())),
            Some(other) => {
                Err(ValidationError::invalid_format(other.to_string()).with_slot(slot.key()))
            }
        }
    }

    pub fn into_record(self, fallback_name: &str) -> Result<ThemeRecord, Vec<ValidationError>> {
        self.into_record_with(fallback_name, |slot| vec![slot.key()])
    }

    pub(crate) fn into_record_with(
        self,
        fallback_name: &str,
        keys_for: impl Fn(TerminalSlot) -> Vec<&'static str>,
    ) -> Result<ThemeRecord, Vec<ValidationError>> {
        let name = self.name.clone().unwrap_or_else(|| fallback_name.to_string());
        let mut errors: Vec<ValidationError> =
            ThemeNameValidator.validate(&name).err().into_iter().collect();
        let mut colors = [ColorValue::BLACK; TerminalSlot::COUNT];

        for slot in TerminalSlot::ALL {
            match self.parse_slot(slot, &keys_for(slot)) {
                Ok(color) => colors[slot.index()] = color,
                Err(error) => errors.push(error),
            }
        }

        if errors.is_empty() {
            Ok(ThemeRecord { name, colors })
        } else {
            Err(errors)
        }
    }
}

/// Ordered mapping from theme name to [`ThemeRecord`].
///
/// Insertion order is the user's display order and survives load, rename
/// and serialize. The map key is authoritative for a record's name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeCollection {
    themes: IndexMap<String, ThemeRecord>,
}

impl ThemeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThemeRecord> {
        self.themes.values()
    }

    pub fn get(&self, name: &str) -> Option<&ThemeRecord> {
        self.themes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ThemeRecord> {
        self.themes.get_mut(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.themes.get_index_of(name)
    }

    /// Append a record; fails if its name is taken.
    pub fn insert(&mut self, record: ThemeRecord) -> ThemeResult<()> {
        let index = self.themes.len();
        self.insert_at(index, record)
    }

    /// Insert a record at `index` (clamped to the end).
    pub fn insert_at(&mut self, index: usize, record: ThemeRecord) -> ThemeResult<()> {
        if self.themes.contains_key(&record.name) {
            return Err(ThemeError::NameConflict { name: record.name });
        }
        let errors = record.validate();
        if !errors.is_empty() {
            return Err(ThemeError::validation(format!("theme '{}'", record.name), errors));
        }

        let index = index.min(self.themes.len());
        self.themes.shift_insert(index, record.name.clone(), record);
        Ok(())
    }

    /// Insert or replace by name, keeping the position of a replaced entry.
    pub fn upsert(&mut self, record: ThemeRecord) -> Option<ThemeRecord> {
        match self.themes.get_mut(&record.name) {
            Some(existing) => Some(std::mem::replace(existing, record)),
            None => {
                self.themes.insert(record.name.clone(), record);
                None
            }
        }
    }

    /// Rename a theme in place; its position in the collection is kept.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> ThemeResult<()> {
        let Some(index) = self.themes.get_index_of(old_name) else {
            return Err(ThemeError::NotFound {
                name: old_name.to_string(),
            });
        };
        if old_name == new_name {
            return Ok(());
        }
        if self.themes.contains_key(new_name) {
            return Err(ThemeError::NameConflict {
                name: new_name.to_string(),
            });
        }
        ThemeNameValidator
            .validate(new_name)
            .map_err(|e| ThemeError::validation(format!("theme '{old_name}'"), vec![e]))?;

        if let Some((_, mut record)) = self.themes.shift_remove_index(index) {
            record.name = new_name.to_string();
            self.themes.shift_insert(index, new_name.to_string(), record);
        }
        log::debug!("Renamed theme '{old_name}' to '{new_name}'");
        Ok(())
    }

    /// Deep-copy a theme under a new name, appended at the end.
    pub fn duplicate(&mut self, name: &str, new_name: &str) -> ThemeResult<&ThemeRecord> {
        let Some(source) = self.themes.get(name) else {
            return Err(ThemeError::NotFound {
                name: name.to_string(),
            });
        };
        if self.themes.contains_key(new_name) {
            return Err(ThemeError::NameConflict {
                name: new_name.to_string(),
            });
        }

        let mut copy = source.clone();
        copy.name = new_name.to_string();
        self.insert(copy)?;

        self.themes.get(new_name).ok_or_else(|| ThemeError::NotFound {
            name: new_name.to_string(),
        })
    }

    /// Remove a theme, returning its former position and the record.
    pub fn delete(&mut self, name: &str) -> ThemeResult<(usize, ThemeRecord)> {
        self.themes
            .shift_remove_full(name)
            .map(|(index, _, record)| (index, record))
            .ok_or_else(|| ThemeError::NotFound {
                name: name.to_string(),
            })
    }

    /// Parse a collection file: a JSON object keyed by theme name.
    ///
    /// Problems in every theme are collected into one `Validation` error, each
    /// slot prefixed with its theme name.
    pub fn load(bytes: &[u8]) -> ThemeResult<Self> {
        let root: Value =
            serde_json::from_slice(bytes).map_err(|e| ThemeError::parse("theme collection", e))?;
        let Some(object) = root.as_object() else {
            return Err(ThemeError::parse(
                "theme collection",
                "root must be a JSON object keyed by theme name",
            ));
        };

        let mut collection = ThemeCollection::new();
        let mut errors = Vec::new();

        for (key, value) in object {
            let mut raw = match RawThemeRecord::from_json(value) {
                Ok(raw) => raw,
                Err(problems) => {
                    errors.extend(problems.into_iter().map(|e| e.with_slot(key.clone())));
                    continue;
                }
            };

            if raw.name.as_deref().is_some_and(|inner| inner != key) {
                log::debug!(
                    "Theme '{key}' declares name '{}'; using the key",
                    raw.name.as_deref().unwrap_or_default()
                );
            }
            raw.name = Some(key.clone());

            match raw.into_record(key) {
                Ok(record) => {
                    collection.themes.insert(key.clone(), record);
                }
                Err(problems) => errors.extend(problems.into_iter().map(|e| prefix_slot(e, key))),
            }
        }

        if !errors.is_empty() {
            return Err(ThemeError::validation("theme collection", errors));
        }

        log::debug!("Loaded {} themes", collection.len());
        Ok(collection)
    }

    /// Serialize in collection order; every record is validated first.
    pub fn serialize(&self) -> ThemeResult<Vec<u8>> {
        let errors: Vec<ValidationError> = self
            .themes
            .iter()
            .flat_map(|(key, record)| {
                let mut problems = record.validate();
                if key != &record.name {
                    problems.push(
                        ValidationError::new(ValidationErrorKind::InvalidName)
                            .with_slot("name")
                            .with_value(record.name.clone()),
                    );
                }
                problems.into_iter().map(move |e| prefix_slot(e, key))
            })
            .collect();
        if !errors.is_empty() {
            return Err(ThemeError::validation("theme collection", errors));
        }

        let mut bytes = serde_json::to_vec_pretty(&self.themes)
            .map_err(|e| ThemeError::parse("theme collection", e))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

fn prefix_slot(mut error: ValidationError, theme: &str) -> ValidationError {
    error.slot = Some(match error.slot.take() {
        Some(slot) => format!("{theme}.{slot}"),
        None => theme.to_string(),
    });
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};

    const NORD: &str = r##"{
        "Nord": {
            "name": "Nord",
            "background": "#2E3440", "foreground": "#D8DEE9",
            "cursor": "#D8DEE9", "selection": "#434C5E",
            "black": "#3B4252", "red": "#BF616A", "green": "#A3BE8C", "yellow": "#EBCB8B",
            "blue": "#81A1C1", "purple": "#B48EAD", "cyan": "#88C0D0", "white": "#E5E9F0",
            "brightBlack": "#4C566A", "brightRed": "#BF616A",
            "brightGreen": "#A3BE8C", "brightYellow": "#EBCB8B",
            "brightBlue": "#81A1C1", "brightPurple": "#B48EAD",
            "brightCyan": "#8FBCBB", "brightWhite": "#ECEFF4"
        }
    }"##;

    fn nord_collection() -> ThemeCollection {
        ThemeCollection::load(NORD.as_bytes()).expect("nord parses")
    }

    #[test]
    fn test_slot_keys_round_trip() {
        for slot in TerminalSlot::ALL {
            assert_eq!(TerminalSlot::from_key(slot.key()), Some(slot));
        }
        assert_eq!(TerminalSlot::from_key("magenta"), None);
    }

    #[test]
    fn test_load_corrects_inner_name_to_key() {
        let json = NORD.replacen("\"name\": \"Nord\"", "\"name\": \"Something Else\"", 1);
        let collection = assert_ok!(ThemeCollection::load(json.as_bytes()));
        assert_eq!(collection.get("Nord").map(|t| t.name.as_str()), Some("Nord"));
    }

    #[test]
    fn test_load_reports_every_bad_slot() {
        let json = NORD
            .replace("\"red\": \"#BF616A\", ", "")
            .replace("\"#EBCB8B\", \"blue\"", "\"yellowish\", \"blue\"");
        let error = assert_err!(ThemeCollection::load(json.as_bytes()));
        let ThemeError::Validation { errors, .. } = error else {
            panic!("expected validation error, got {error:?}");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.slot.as_deref() == Some("Nord.red")
            && e.kind == ValidationErrorKind::MissingSlot));
        assert!(errors.iter().any(|e| e.slot.as_deref() == Some("Nord.yellow")
            && e.kind == ValidationErrorKind::InvalidFormat));
    }

    #[test]
    fn test_load_rejects_non_object_root() {
        assert!(matches!(
            ThemeCollection::load(b"[1, 2]"),
            Err(ThemeError::Parse { .. })
        ));
        assert!(matches!(
            ThemeCollection::load(b"{ not json"),
            Err(ThemeError::Parse { .. })
        ));
    }

    #[test]
    fn test_shorthand_colors_are_normalized_on_load() {
        let json = NORD.replace("\"#2E3440\"", "\"#abc\"");
        let collection = assert_ok!(ThemeCollection::load(json.as_bytes()));
        let nord = collection.get("Nord").expect("nord");
        assert_eq!(nord.get(TerminalSlot::Background).to_hex(false), "#AABBCC");
    }

    #[test]
    fn test_duplicate_same_name_conflicts() {
        let mut collection = nord_collection();
        assert!(matches!(
            collection.duplicate("Nord", "Nord"),
            Err(ThemeError::NameConflict { .. })
        ));
        assert!(matches!(
            collection.duplicate("Missing", "Other"),
            Err(ThemeError::NotFound { .. })
        ));

        let copy = assert_ok!(collection.duplicate("Nord", "Nord Copy")).clone();
        assert_eq!(copy.name, "Nord Copy");
        assert_eq!(collection.names().collect::<Vec<_>>(), vec!["Nord", "Nord Copy"]);
        for slot in TerminalSlot::ALL {
            assert_eq!(copy.get(slot), collection.get("Nord").expect("nord").get(slot));
        }
    }

    #[test]
    fn test_rename_round_trip_restores_collection() {
        let mut collection = nord_collection();
        collection.insert(ThemeRecord::default_dark("Second")).expect("insert");
        let original = collection.clone();

        assert_ok!(collection.rename("Nord", "Gruvbox"));
        assert_eq!(collection.names().collect::<Vec<_>>(), vec!["Gruvbox", "Second"]);
        assert_ok!(collection.rename("Gruvbox", "Nord"));

        assert_eq!(collection, original);
        assert_eq!(
            collection.serialize().expect("serialize"),
            original.serialize().expect("serialize")
        );
    }

    #[test]
    fn test_rename_conflicts_are_case_sensitive() {
        let mut collection = nord_collection();
        collection.insert(ThemeRecord::default_dark("Dracula")).expect("insert");

        assert!(matches!(
            collection.rename("Nord", "Dracula"),
            Err(ThemeError::NameConflict { .. })
        ));
        assert_ok!(collection.rename("Nord", "dracula"));
        assert!(matches!(
            collection.rename("Nord", "X"),
            Err(ThemeError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete() {
        let mut collection = nord_collection();
        let (index, record) = assert_ok!(collection.delete("Nord"));
        assert_eq!(index, 0);
        assert_eq!(record.name, "Nord");
        assert!(collection.is_empty());
        assert!(matches!(
            collection.delete("Nord"),
            Err(ThemeError::NotFound { .. })
        ));
    }

    #[test]
    fn test_serialize_preserves_order_and_reloads() {
        let mut collection = ThemeCollection::new();
        for name in ["Zenburn", "Ayu", "Monokai"] {
            collection.insert(ThemeRecord::default_dark(name)).expect("insert");
        }

        let bytes = assert_ok!(collection.serialize());
        let text = String::from_utf8(bytes.clone()).expect("utf8");
        let zen = text.find("\"Zenburn\"").expect("zenburn");
        let ayu = text.find("\"Ayu\"").expect("ayu");
        let monokai = text.find("\"Monokai\"").expect("monokai");
        assert!(zen < ayu && ayu < monokai);

        let reloaded = assert_ok!(ThemeCollection::load(&bytes));
        assert_eq!(reloaded, collection);
    }

    #[test]
    fn test_serialize_rejects_invalid_record() {
        let mut collection = nord_collection();
        if let Some(record) = collection.get_mut("Nord") {
            record.name = String::new();
        }
        assert!(matches!(
            collection.serialize(),
            Err(ThemeError::Validation { .. })
        ));
    }

    #[test]
    fn test_raw_validate_lists_all_missing_slots() {
        let raw = assert_ok!(RawThemeRecord::from_json(&serde_json::json!({ "name": "Empty" })));
        let errors = raw.validate();
        assert_eq!(errors.len(), TerminalSlot::COUNT);
        assert!(errors.iter().all(|e| e.kind == ValidationErrorKind::MissingSlot));
    }

    #[test]
    fn test_low_contrast_flag() {
        let mut record = ThemeRecord::default_dark("Dim");
        assert!(!record.has_low_contrast());
        record.set(TerminalSlot::Foreground, ColorValue::rgb(0x10, 0x10, 0x10));
        assert!(record.has_low_contrast());
    }
}
