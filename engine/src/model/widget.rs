use crate::color::ColorValue;
use crate::common::errors::{ThemeError, ThemeResult, ValidationError};
use crate::validation::{ThemeNameValidator, Validator};
use indexmap::IndexMap;
use serde_json::{Value, json};

/// Properties of one widget class. Values are opaque: color pairs, scalars
/// (`corner_radius`) and nested objects (`CTkFont`) pass through untouched.
pub type WidgetProperties = IndexMap<String, Value>;

/// The four roles projected out of the per-widget mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConvenienceRole {
    Primary,
    Secondary,
    Background,
    Text,
}

impl ConvenienceRole {
    pub const ALL: [ConvenienceRole; 4] = [
        ConvenienceRole::Primary,
        ConvenienceRole::Secondary,
        ConvenienceRole::Background,
        ConvenienceRole::Text,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ConvenienceRole::Primary => "primary",
            ConvenienceRole::Secondary => "secondary",
            ConvenienceRole::Background => "background",
            ConvenienceRole::Text => "text",
        }
    }

    /// `(widget, property)` lookup order. The first path whose property
    /// exists is the one read and written.
    pub fn paths(self) -> &'static [(&'static str, &'static str)] {
        match self {
            ConvenienceRole::Primary => {
                &[("CTkButton", "fg_color"), ("CTkSwitch", "progress_color")]
            }
            ConvenienceRole::Secondary => &[
                ("CTkButton", "hover_color"),
                ("CTkSwitch", "button_hover_color"),
            ],
            ConvenienceRole::Background => &[("CTk", "fg_color"), ("CTkToplevel", "fg_color")],
            ConvenienceRole::Text => &[("CTkLabel", "text_color"), ("CTkButton", "text_color")],
        }
    }
}

/// A `[light, dark]` color pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPair {
    pub light: ColorValue,
    pub dark: ColorValue,
}

impl ColorPair {
    pub fn new(light: ColorValue, dark: ColorValue) -> Self {
        Self { light, dark }
    }

    /// The same color in both modes.
    pub fn uniform(color: ColorValue) -> Self {
        Self::new(color, color)
    }

    /// `["#LLLLLL", "#DDDDDD"]`; alpha is written only when a color has one.
    pub fn to_json(self) -> Value {
        json!([self.light.to_hex(true), self.dark.to_hex(true)])
    }
}

/// Result of [`WidgetThemeRecord::extract_convenience_pairs`]. A role whose
/// path is absent or does not resolve to colors is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConveniencePairs {
    pub primary: Option<ColorPair>,
    pub secondary: Option<ColorPair>,
    pub background: Option<ColorPair>,
    pub text: Option<ColorPair>,
}

impl ConveniencePairs {
    pub fn get(&self, role: ConvenienceRole) -> Option<ColorPair> {
        match role {
            ConvenienceRole::Primary => self.primary,
            ConvenienceRole::Secondary => self.secondary,
            ConvenienceRole::Background => self.background,
            ConvenienceRole::Text => self.text,
        }
    }
}

/// A widget-toolkit theme: widget class → property → value.
///
/// The format has no name field; the name comes from the file it was loaded
/// from.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetThemeRecord {
    pub name: String,
    widgets: IndexMap<String, WidgetProperties>,
}

impl WidgetThemeRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            widgets: IndexMap::new(),
        }
    }

    /// The toolkit's stock theme structure.
    pub fn default_theme(name: impl Into<String>) -> Self {
        let data = json!({
            "CTk": {
                "fg_color": ["gray92", "gray14"]
            },
            "CTkButton": {
                "corner_radius": 6,
                "border_width": 0,
                "fg_color": ["#2CC985", "#2FA572"],
                "hover_color": ["#0C955A", "#106A43"],
                "border_color": ["#3E454A", "#949A9F"],
                "text_color": ["gray98", "#DCE4EE"],
                "text_color_disabled": ["gray78", "gray68"]
            },
            "CTkEntry": {
                "corner_radius": 6,
                "border_width": 2,
                "fg_color": ["#F9F9FA", "#343638"],
                "border_color": ["#979DA2", "#565B5E"],
                "text_color": ["gray10", "#DCE4EE"],
                "placeholder_text_color": ["gray52", "gray62"]
            },
            "CTkFont": {
                "Windows": {
                    "family": "Roboto",
                    "size": 13,
                    "weight": "normal"
                }
            }
        });

        let mut record = Self::new(name);
        if let Value::Object(widgets) = data {
            for (widget, properties) in widgets {
                if let Value::Object(properties) = properties {
                    record.widgets.insert(widget, properties.into_iter().collect());
                }
            }
        }
        record
    }

    pub fn widgets(&self) -> impl Iterator<Item = (&str, &WidgetProperties)> {
        self.widgets.iter().map(|(name, props)| (name.as_str(), props))
    }

    pub fn property(&self, widget: &str, property: &str) -> Option<&Value> {
        self.widgets.get(widget)?.get(property)
    }

    /// Set a property, creating the widget entry if needed.
    pub fn set_property(&mut self, widget: &str, property: &str, value: Value) -> Option<Value> {
        self.widgets
            .entry(widget.to_string())
            .or_default()
            .insert(property.to_string(), value)
    }

    pub fn extract_convenience_pairs(&self) -> ConveniencePairs {
        ConveniencePairs {
            primary: self.convenience_pair(ConvenienceRole::Primary),
            secondary: self.convenience_pair(ConvenienceRole::Secondary),
            background: self.convenience_pair(ConvenienceRole::Background),
            text: self.convenience_pair(ConvenienceRole::Text),
        }
    }

    pub fn convenience_pair(&self, role: ConvenienceRole) -> Option<ColorPair> {
        let value = role
            .paths()
            .iter()
            .find_map(|(widget, property)| self.property(widget, property))?;
        resolve_pair(value)
    }

    /// Write a pair back through the same path extraction reads.
    pub fn apply_convenience_pair(
        &mut self,
        role: ConvenienceRole,
        light: ColorValue,
        dark: ColorValue,
    ) {
        let paths = role.paths();
        let (widget, property) = paths
            .iter()
            .find(|(widget, property)| self.property(widget, property).is_some())
            .unwrap_or(&paths[0]);

        self.set_property(widget, property, ColorPair::new(light, dark).to_json());
    }

    /// Every `[light, dark]` string pair, keyed by dotted path.
    pub fn color_pairs(&self) -> IndexMap<String, [String; 2]> {
        let mut pairs = IndexMap::new();
        for (widget, properties) in &self.widgets {
            for (property, value) in properties {
                collect_pairs(&format!("{widget}.{property}"), value, &mut pairs);
            }
        }
        pairs
    }

    /// Name problems plus every color token that does not resolve.
    ///
    /// `transparent` is a legal token in this format and is not reported.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors: Vec<ValidationError> =
            ThemeNameValidator.validate(&self.name).err().into_iter().collect();

        for (path, tokens) in self.color_pairs() {
            for token in tokens {
                if token.eq_ignore_ascii_case("transparent") {
                    continue;
                }
                if resolve_named_color(&token).is_err() {
                    errors.push(ValidationError::invalid_format(token).with_slot(path.clone()));
                }
            }
        }
        errors
    }

    pub fn load(bytes: &[u8], name: impl Into<String>) -> ThemeResult<Self> {
        let name = name.into();
        let root: Value =
            serde_json::from_slice(bytes).map_err(|e| ThemeError::parse("widget theme", e))?;
        let Value::Object(root) = root else {
            return Err(ThemeError::parse(
                "widget theme",
                "root must be a JSON object keyed by widget class",
            ));
        };

        let mut record = Self::new(name);
        let mut errors = Vec::new();
        for (widget, properties) in root {
            match properties {
                Value::Object(properties) => {
                    record.widgets.insert(widget, properties.into_iter().collect());
                }
                other => errors
                    .push(ValidationError::invalid_format(other.to_string()).with_slot(widget)),
            }
        }

        if !errors.is_empty() {
            return Err(ThemeError::validation(format!("widget theme '{}'", record.name), errors));
        }
        Ok(record)
    }

    pub fn serialize(&self) -> ThemeResult<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(&self.widgets)
            .map_err(|e| ThemeError::parse("widget theme", e))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

fn collect_pairs(path: &str, value: &Value, pairs: &mut IndexMap<String, [String; 2]>) {
    match value {
        Value::Array(items) if items.len() == 2 => {
            if let (Some(light), Some(dark)) = (items[0].as_str(), items[1].as_str()) {
                pairs.insert(path.to_string(), [light.to_string(), dark.to_string()]);
            }
        }
        Value::Object(nested) => {
            for (key, value) in nested {
                collect_pairs(&format!("{path}.{key}"), value, pairs);
            }
        }
        _ => {}
    }
}

/// A pair property, or a single color used for both modes.
fn resolve_pair(value: &Value) -> Option<ColorPair> {
    match value {
        Value::Array(items) if items.len() == 2 => {
            let light = resolve_named_color(items[0].as_str()?).ok()?;
            let dark = resolve_named_color(items[1].as_str()?).ok()?;
            Some(ColorPair::new(light, dark))
        }
        Value::String(token) => resolve_named_color(token).ok().map(ColorPair::uniform),
        _ => None,
    }
}

/// Resolve a widget-theme color token: any [`ColorValue`] form, or one of a
/// fixed table of names.
///
/// `grayN` / `greyN` for N in 0..=100 map to `N * 2.55` rounded half up.
pub fn resolve_named_color(token: &str) -> ThemeResult<ColorValue> {
    let trimmed = token.trim();
    if trimmed.starts_with('#') || trimmed.to_ascii_lowercase().starts_with("rgb(") {
        return ColorValue::parse(trimmed).map_err(ThemeError::from);
    }

    let lower = trimmed.to_ascii_lowercase();
    let unknown = || ThemeError::UnknownColorName {
        token: token.to_string(),
    };

    let named = match lower.as_str() {
        "white" => ColorValue::WHITE,
        "black" => ColorValue::BLACK,
        "red" => ColorValue::rgb(0xFF, 0x00, 0x00),
        "green" => ColorValue::rgb(0x00, 0xFF, 0x00),
        "blue" => ColorValue::rgb(0x00, 0x00, 0xFF),
        "yellow" => ColorValue::rgb(0xFF, 0xFF, 0x00),
        "cyan" => ColorValue::rgb(0x00, 0xFF, 0xFF),
        "magenta" => ColorValue::rgb(0xFF, 0x00, 0xFF),
        "gray" | "grey" => ColorValue::rgb(0xBE, 0xBE, 0xBE),
        other => {
            let level = other
                .strip_prefix("gray")
                .or_else(|| other.strip_prefix("grey"))
                .filter(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
                .and_then(|digits| digits.parse::<u32>().ok())
                .filter(|level| *level <= 100)
                .ok_or_else(unknown)?;
            let channel = u8::try_from((level * 255 + 50) / 100).map_err(|_| unknown())?;
            ColorValue::rgb(channel, channel, channel)
        }
    };
    Ok(named)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_none, assert_ok, assert_some};

    fn hex(text: &str) -> ColorValue {
        ColorValue::parse(text).expect("valid color")
    }

    #[test]
    fn test_named_gray_table() {
        assert_eq!(assert_ok!(resolve_named_color("gray92")).to_hex(false), "#EBEBEB");
        assert_eq!(assert_ok!(resolve_named_color("grey14")).to_hex(false), "#242424");
        assert_eq!(assert_ok!(resolve_named_color("gray0")), ColorValue::BLACK);
        assert_eq!(assert_ok!(resolve_named_color("gray100")), ColorValue::WHITE);
        assert_eq!(assert_ok!(resolve_named_color("Gray")).to_hex(false), "#BEBEBE");
        assert_eq!(assert_ok!(resolve_named_color("#abc")).to_hex(false), "#AABBCC");
    }

    #[test]
    fn test_unknown_names_fail() {
        for token in ["gray101", "transparent", "grayish", "periwinkle"] {
            assert!(matches!(
                resolve_named_color(token),
                Err(ThemeError::UnknownColorName { .. })
            ));
        }
        assert!(matches!(
            resolve_named_color("#12"),
            Err(ThemeError::Validation { .. })
        ));
    }

    #[test]
    fn test_extract_from_default_theme() {
        let theme = WidgetThemeRecord::default_theme("Stock");
        let pairs = theme.extract_convenience_pairs();

        let primary = assert_some!(pairs.primary);
        assert_eq!(primary.light.to_hex(false), "#2CC985");
        assert_eq!(primary.dark.to_hex(false), "#2FA572");

        let background = assert_some!(pairs.background);
        assert_eq!(background.dark.to_hex(false), "#242424");

        // CTkLabel is absent, so text falls back to CTkButton.text_color
        let text = assert_some!(pairs.text);
        assert_eq!(text.dark.to_hex(false), "#DCE4EE");
    }

    #[test]
    fn test_absent_pairs_are_not_fabricated() {
        let theme = WidgetThemeRecord::new("Empty");
        assert_eq!(theme.extract_convenience_pairs(), ConveniencePairs::default());

        let mut transparent = WidgetThemeRecord::new("Clear");
        transparent.set_property("CTk", "fg_color", json!(["transparent", "transparent"]));
        assert_none!(transparent.convenience_pair(ConvenienceRole::Background));
    }

    #[test]
    fn test_apply_writes_existing_fallback_path() {
        let mut theme = WidgetThemeRecord::new("Switches");
        theme.set_property("CTkSwitch", "progress_color", json!(["#111111", "#222222"]));

        theme.apply_convenience_pair(ConvenienceRole::Primary, hex("#AAAAAA"), hex("#BBBBBB"));

        assert_none!(theme.property("CTkButton", "fg_color"));
        assert_eq!(
            theme.property("CTkSwitch", "progress_color"),
            Some(&json!(["#AAAAAA", "#BBBBBB"]))
        );
    }

    #[test]
    fn test_apply_creates_first_path_when_absent() {
        let mut theme = WidgetThemeRecord::new("Empty");
        theme.apply_convenience_pair(ConvenienceRole::Text, hex("#010101"), hex("#FEFEFE"));

        assert_some!(theme.property("CTkLabel", "text_color"));
        let text = assert_some!(theme.convenience_pair(ConvenienceRole::Text));
        assert_eq!(text, ColorPair::new(hex("#010101"), hex("#FEFEFE")));
    }

    #[test]
    fn test_apply_keeps_alpha() {
        let mut theme = WidgetThemeRecord::default_theme("Translucent");
        let (light, dark) = (hex("#11223380"), hex("#44556699"));
        theme.apply_convenience_pair(ConvenienceRole::Primary, light, dark);

        assert_eq!(
            theme.property("CTkButton", "fg_color"),
            Some(&json!(["#11223380", "#44556699"]))
        );
        let primary = assert_some!(theme.convenience_pair(ConvenienceRole::Primary));
        assert_eq!(primary, ColorPair::new(light, dark));
        assert_eq!(primary.light.alpha(), Some(0x80));
    }

    #[test]
    fn test_color_pairs_walk_nested_objects() {
        let pairs = WidgetThemeRecord::default_theme("Stock").color_pairs();
        assert_eq!(
            pairs.get("CTkButton.fg_color"),
            Some(&["#2CC985".to_string(), "#2FA572".to_string()])
        );
        assert!(!pairs.contains_key("CTkButton.corner_radius"));
        assert!(!pairs.keys().any(|k| k.starts_with("CTkFont")));
    }

    #[test]
    fn test_load_keeps_opaque_values_and_order() {
        let json = br##"{
  "CTkFrame": { "corner_radius": 6, "fg_color": ["gray86", "gray17"] },
  "CTk": { "fg_color": ["gray92", "gray14"] }
}"##;
        let theme = assert_ok!(WidgetThemeRecord::load(json, "Frames"));
        let widgets: Vec<&str> = theme.widgets().map(|(name, _)| name).collect();
        assert_eq!(widgets, vec!["CTkFrame", "CTk"]);
        assert_eq!(theme.property("CTkFrame", "corner_radius"), Some(&json!(6)));

        let bytes = assert_ok!(theme.serialize());
        let reloaded = assert_ok!(WidgetThemeRecord::load(&bytes, "Frames"));
        assert_eq!(reloaded, theme);
    }

    #[test]
    fn test_load_rejects_non_object_widget() {
        let error = assert_err!(WidgetThemeRecord::load(br#"{ "CTk": 5 }"#, "Bad"));
        assert!(matches!(error, ThemeError::Validation { .. }));
    }

    #[test]
    fn test_validate_flags_unknown_tokens_only() {
        let mut theme = WidgetThemeRecord::default_theme("Stock");
        assert!(theme.validate().is_empty());

        theme.set_property("CTkFrame", "fg_color", json!(["transparent", "mauve"]));
        let errors = theme.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].slot.as_deref(), Some("CTkFrame.fg_color"));
    }
}
