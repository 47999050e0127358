use super::terminal::{RawThemeRecord, TerminalSlot, ThemeRecord};
use crate::color::ColorValue;
use crate::common::errors::ValidationError;
use serde_json::Value;

/// A color scheme embedded in a terminal host's settings document.
///
/// Carries the same 20 slots as [`ThemeRecord`]; only the on-disk key names
/// differ. Hosts call the cursor and selection slots `cursorColor` and
/// `selectionBackground`, and those are the keys written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedSchemeRecord {
    record: ThemeRecord,
}

impl EmbeddedSchemeRecord {
    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn get(&self, slot: TerminalSlot) -> ColorValue {
        self.record.get(slot)
    }

    pub fn set(&mut self, slot: TerminalSlot, color: ColorValue) -> ColorValue {
        self.record.set(slot, color)
    }

    pub fn as_terminal(&self) -> &ThemeRecord {
        &self.record
    }

    pub fn into_terminal(self) -> ThemeRecord {
        self.record
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        self.record.validate()
    }

    /// Parse one entry of a `schemes` array.
    ///
    /// A scheme without a `name` is rejected: it has no identity in the array.
    pub fn from_json(value: &Value) -> Result<Self, Vec<ValidationError>> {
        let raw = RawThemeRecord::from_json(value)?;
        if raw.name.is_none() {
            return Err(vec![ValidationError::missing_slot("name")]);
        }
        raw.into_record_with("", accepted_keys)
            .map(|record| Self { record })
    }

    /// Host-native JSON object: `name` first, then slots in file order.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("name".to_string(), Value::String(self.record.name.clone()));
        for (slot, color) in self.record.iter() {
            map.insert(host_key(slot).to_string(), Value::String(color.to_hex(false)));
        }
        Value::Object(map)
    }
}

impl From<ThemeRecord> for EmbeddedSchemeRecord {
    fn from(record: ThemeRecord) -> Self {
        Self { record }
    }
}

impl From<EmbeddedSchemeRecord> for ThemeRecord {
    fn from(scheme: EmbeddedSchemeRecord) -> Self {
        scheme.record
    }
}

/// Key written into host documents.
pub fn host_key(slot: TerminalSlot) -> &'static str {
    match slot {
        TerminalSlot::Cursor => "cursorColor",
        TerminalSlot::Selection => "selectionBackground",
        other => other.key(),
    }
}

fn accepted_keys(slot: TerminalSlot) -> Vec<&'static str> {
    match slot {
        TerminalSlot::Cursor | TerminalSlot::Selection => vec![host_key(slot), slot.key()],
        other => vec![other.key()],
    }
}
