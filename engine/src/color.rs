//! # Color Values
//!
//! Immutable 24-bit RGB colors with an optional alpha channel. Every accepted
//! textual form normalizes to the canonical uppercase `#RRGGBB` spelling, so
//! two colors that render the same always compare and serialize the same.
//!
//! Accepted inputs:
//!
//! - `#RGB` shorthand, expanded by nibble duplication (`#5A3` → `#55AA33`)
//! - `#RRGGBB`
//! - `#RRGGBBAA`
//! - `rgb(r, g, b)` with decimal components in `0..=255`
//!
//! Named colors are deliberately rejected here; the widget-theme format is the
//! only place that resolves names (see [`crate::model::widget`]).

use crate::common::errors::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Minimum contrast ratio for normal text (WCAG AA).
pub const WCAG_AA_CONTRAST: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorValue {
    r: u8,
    g: u8,
    b: u8,
    a: Option<u8>,
}

impl ColorValue {
    pub const BLACK: ColorValue = ColorValue::rgb(0, 0, 0);
    pub const WHITE: ColorValue = ColorValue::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: None }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r,
            g,
            b,
            a: Some(a),
        }
    }

    /// Parse any accepted textual form.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let trimmed = text.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            return Self::parse_hex(hex).ok_or_else(|| ValidationError::invalid_format(text));
        }

        if let Some(body) = strip_rgb_function(trimmed) {
            return Self::parse_rgb_function(body, text);
        }

        Err(ValidationError::invalid_format(text))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        let nibble = |index: usize| {
            u8::from_str_radix(&hex[index..index + 1], 16)
                .ok()
                .map(|n| n * 17)
        };

        match hex.len() {
            3 => Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    fn parse_rgb_function(body: &str, original: &str) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ValidationError::invalid_format(original));
        }

        let mut channels = [0u8; 3];
        for (channel, part) in channels.iter_mut().zip(&parts) {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(ValidationError::invalid_format(original));
            }
            // Digit-only strings that overflow u32 are still out of range,
            // not malformed.
            let value = part.parse::<u32>().unwrap_or(u32::MAX);
            *channel = u8::try_from(value).map_err(|_| ValidationError::out_of_range(original))?;
        }

        Ok(Self::rgb(channels[0], channels[1], channels[2]))
    }

    /// Canonical uppercase hex. Alpha is only emitted when requested and present.
    pub fn to_hex(&self, include_alpha: bool) -> String {
        match (include_alpha, self.a) {
            (true, Some(a)) => format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, a),
            _ => format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b),
        }
    }

    pub fn to_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub fn to_rgba(&self) -> (u8, u8, u8, Option<u8>) {
        (self.r, self.g, self.b, self.a)
    }

    pub fn alpha(&self) -> Option<u8> {
        self.a
    }

    /// The same color with the alpha channel dropped.
    pub fn opaque(&self) -> Self {
        Self::rgb(self.r, self.g, self.b)
    }

    /// Relative luminance per WCAG 2.x.
    pub fn relative_luminance(&self) -> f64 {
        fn linearize(channel: u8) -> f64 {
            let c = f64::from(channel) / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        0.2126 * linearize(self.r) + 0.7152 * linearize(self.g) + 0.0722 * linearize(self.b)
    }

    /// WCAG contrast ratio in `1.0..=21.0`, symmetric in its arguments.
    pub fn contrast_ratio(&self, other: &ColorValue) -> f64 {
        let a = self.relative_luminance();
        let b = other.relative_luminance();
        let (lighter, darker) = if a >= b { (a, b) } else { (b, a) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// Whether text in one color on the other falls below WCAG AA.
    ///
    /// Only used to flag pairs; nothing in the engine rejects a theme for it.
    pub fn is_low_contrast(&self, other: &ColorValue) -> bool {
        self.contrast_ratio(other) < WCAG_AA_CONTRAST
    }

    /// Black or white, whichever reads better on this color.
    pub fn contrast_text(&self) -> ColorValue {
        if self.contrast_ratio(&Self::BLACK) >= self.contrast_ratio(&Self::WHITE) {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }

    /// Linear per-channel interpolation toward `other`.
    ///
    /// `t` is clamped to `0.0..=1.0`; rounding is half away from zero so the
    /// result is a pure function of its inputs. The result is opaque.
    pub fn blend(&self, other: &ColorValue, t: f64) -> ColorValue {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |from: u8, to: u8| {
            let from = f64::from(from);
            let to = f64::from(to);
            (from + (to - from) * t).round() as u8
        };

        ColorValue::rgb(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }

    /// RGB inversion (alpha is kept).
    pub fn invert(&self) -> ColorValue {
        ColorValue {
            r: 255 - self.r,
            g: 255 - self.g,
            b: 255 - self.b,
            a: self.a,
        }
    }
}

fn strip_rgb_function(text: &str) -> Option<&str> {
    let prefix = text.get(..4)?;
    if !prefix.eq_ignore_ascii_case("rgb(") {
        return None;
    }
    text[4..].strip_suffix(')')
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex(false))
    }
}

impl FromStr for ColorValue {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ColorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex(true))
    }
}

impl<'de> Deserialize<'de> for ColorValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        ColorValue::parse(&text).map_err(serde::de::Error::custom)
    }
}
