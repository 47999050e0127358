//! # Host Document Editing
//!
//! A terminal host keeps its color schemes in a `schemes` array inside a much
//! larger settings document (`profiles`, `actions`, keybindings, ...). This
//! module edits that one array and nothing else.
//!
//! The document is never re-serialized as a whole. Loading records the byte
//! range of the `schemes` value in the original text; rendering splices a
//! freshly formatted array into that range and copies every other byte
//! verbatim. Sibling sections, key order, whitespace and `//` or `/* */`
//! comments outside the array therefore survive a read-modify-write cycle
//! unchanged.
//!
//! ```no_run
//! use engine::host_document::HostDocument;
//! use engine::model::{EmbeddedSchemeRecord, ThemeRecord};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("settings.json")?;
//! let (mut document, schemes) = HostDocument::load(&bytes)?;
//! println!("{} schemes", schemes.len());
//!
//! document.upsert_scheme(EmbeddedSchemeRecord::from(ThemeRecord::default_dark("Mine")));
//! std::fs::write("settings.json", document.render())?;
//! # Ok(())
//! # }
//! ```

use crate::common::errors::{ThemeError, ThemeResult, ValidationError};
use crate::model::scheme::EmbeddedSchemeRecord;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use std::ops::Range;

const SOURCE_NAME: &str = "host document";
const SCHEMES_KEY: &str = "schemes";
const DEFAULT_INDENT: &str = "    ";

/// One element of the `schemes` array.
#[derive(Debug, Clone, PartialEq)]
enum SchemeEntry {
    Parsed(EmbeddedSchemeRecord),
    /// An element that is not a complete scheme. Kept in place, never dropped.
    Opaque(Value),
}

impl SchemeEntry {
    fn name(&self) -> Option<&str> {
        match self {
            SchemeEntry::Parsed(record) => Some(record.name()),
            SchemeEntry::Opaque(value) => value.get("name").and_then(Value::as_str),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            SchemeEntry::Parsed(record) => record.to_json(),
            SchemeEntry::Opaque(value) => value.clone(),
        }
    }
}

/// A scheme entry that could not be read as a complete record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedScheme {
    pub index: usize,
    pub name: Option<String>,
    pub errors: Vec<ValidationError>,
}

/// Where the `schemes` array lives in the original text.
#[derive(Debug, Clone)]
enum SchemesLocation {
    /// Byte range of the existing array value.
    Present(Range<usize>),
    /// No `schemes` member: insert after the last member (or after `{` when
    /// the root is empty).
    Absent { insert_at: usize, root_empty: bool },
}

/// Opaque handle over a loaded host document.
#[derive(Debug, Clone)]
pub struct HostDocument {
    source: String,
    location: SchemesLocation,
    entries: Vec<SchemeEntry>,
    skipped: Vec<SkippedScheme>,
    indent_unit: String,
    base_indent: String,
    newline: &'static str,
    modified: bool,
}

impl HostDocument {
    /// Parse a host document and the schemes it embeds.
    pub fn load(bytes: &[u8]) -> ThemeResult<(Self, Vec<EmbeddedSchemeRecord>)> {
        let document = Self::parse(bytes)?;
        let schemes = document.schemes().cloned().collect();
        Ok((document, schemes))
    }

    pub fn parse(bytes: &[u8]) -> ThemeResult<Self> {
        let source = std::str::from_utf8(bytes)
            .map_err(|e| ThemeError::parse(SOURCE_NAME, e))?
            .to_string();
        let masked = mask_comments(&source);

        let root: Value =
            serde_json::from_str(&masked).map_err(|e| ThemeError::parse(SOURCE_NAME, e))?;
        let Value::Object(root) = root else {
            return Err(ThemeError::parse(SOURCE_NAME, "root must be a JSON object"));
        };

        let location = locate_schemes(&masked)?;
        let array = match root.get(SCHEMES_KEY) {
            None => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                return Err(ThemeError::parse(SOURCE_NAME, "'schemes' must be an array"));
            }
        };

        let mut entries = Vec::with_capacity(array.len());
        let mut skipped = Vec::new();
        for (index, item) in array.into_iter().enumerate() {
            match EmbeddedSchemeRecord::from_json(&item) {
                Ok(record) => entries.push(SchemeEntry::Parsed(record)),
                Err(errors) => {
                    let name = item.get("name").and_then(Value::as_str).map(str::to_string);
                    log::warn!(
                        "Keeping unreadable scheme #{index} ({}) untouched: {} problem(s)",
                        name.as_deref().unwrap_or("unnamed"),
                        errors.len()
                    );
                    skipped.push(SkippedScheme {
                        index,
                        name,
                        errors,
                    });
                    entries.push(SchemeEntry::Opaque(item));
                }
            }
        }

        let indent_unit = detect_indent(&masked);
        let base_indent = match &location {
            SchemesLocation::Present(span) => line_indent(&masked, span.start),
            SchemesLocation::Absent { .. } => indent_unit.clone(),
        };
        let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };

        log::debug!(
            "Loaded host document: {} schemes, {} skipped",
            entries.len() - skipped.len(),
            skipped.len()
        );

        Ok(Self {
            source,
            location,
            entries,
            skipped,
            indent_unit,
            base_indent,
            newline,
            modified: false,
        })
    }

    /// Readable schemes, in array order.
    pub fn schemes(&self) -> impl Iterator<Item = &EmbeddedSchemeRecord> {
        self.entries.iter().filter_map(|entry| match entry {
            SchemeEntry::Parsed(record) => Some(record),
            SchemeEntry::Opaque(_) => None,
        })
    }

    pub fn scheme(&self, name: &str) -> Option<&EmbeddedSchemeRecord> {
        self.schemes().find(|record| record.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name() == Some(name))
    }

    /// Entries that were kept verbatim because they are not complete schemes.
    pub fn skipped(&self) -> &[SkippedScheme] {
        &self.skipped
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Replace the same-named scheme in place, or append.
    ///
    /// Same-name entries are overwritten, never rejected. Returns the replaced
    /// scheme when there was a readable one.
    pub fn upsert_scheme(
        &mut self,
        record: EmbeddedSchemeRecord,
    ) -> Option<EmbeddedSchemeRecord> {
        self.modified = true;
        let position = self
            .entries
            .iter()
            .position(|entry| entry.name() == Some(record.name()));

        match position {
            Some(index) => {
                log::debug!("Replacing scheme '{}' at position {index}", record.name());
                match std::mem::replace(&mut self.entries[index], SchemeEntry::Parsed(record)) {
                    SchemeEntry::Parsed(previous) => Some(previous),
                    SchemeEntry::Opaque(_) => None,
                }
            }
            None => {
                log::debug!("Appending scheme '{}'", record.name());
                self.entries.push(SchemeEntry::Parsed(record));
                None
            }
        }
    }

    /// Remove a scheme by name. Removing an absent scheme is not an error.
    pub fn remove_scheme(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.name() != Some(name));
        let removed = self.entries.len() != before;
        if removed {
            self.modified = true;
        }
        removed
    }

    /// The document bytes with only the `schemes` array changed.
    ///
    /// An unmodified document renders to exactly the bytes it was loaded from.
    pub fn render(&self) -> Vec<u8> {
        if !self.modified {
            return self.source.clone().into_bytes();
        }

        let array = self.render_array();
        let mut output = String::with_capacity(self.source.len() + array.len());

        match &self.location {
            SchemesLocation::Present(span) => {
                output.push_str(&self.source[..span.start]);
                output.push_str(&array);
                output.push_str(&self.source[span.end..]);
            }
            SchemesLocation::Absent {
                insert_at,
                root_empty,
            } => {
                output.push_str(&self.source[..*insert_at]);
                if !root_empty {
                    output.push(',');
                }
                output.push_str(self.newline);
                output.push_str(&self.indent_unit);
                output.push_str(&format!("\"{SCHEMES_KEY}\": "));
                output.push_str(&array);
                if *root_empty {
                    output.push_str(self.newline);
                }
                output.push_str(&self.source[*insert_at..]);
            }
        }

        output.into_bytes()
    }

    fn render_array(&self) -> String {
        let items: Vec<Value> = self.entries.iter().map(SchemeEntry::to_json).collect();
        if items.is_empty() {
            return "[]".to_string();
        }

        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(self.indent_unit.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        if let Err(error) = items.serialize(&mut serializer) {
            // Serializing a Value tree into memory cannot fail in practice.
            log::error!("Failed to render schemes array: {error}");
            return "[]".to_string();
        }

        let rendered = String::from_utf8_lossy(&buffer);
        let separator = format!("{}{}", self.newline, self.base_indent);
        rendered.replace('\n', &separator)
    }
}

/// Replace `//` and `/* */` comments (and a leading BOM) with spaces.
///
/// Byte offsets are preserved so positions found in the masked text index the
/// original text directly. Newlines inside block comments are kept.
fn mask_comments(source: &str) -> String {
    let mut bytes = source.as_bytes().to_vec();
    let mut i = 0;
    let mut in_string = false;

    if source.starts_with('\u{FEFF}') {
        bytes[..3].fill(b' ');
        i = 3;
    }

    while i < bytes.len() {
        let byte = bytes[i];
        if in_string {
            match byte {
                b'\\' => i += 1,
                b'"' => in_string = false,
                _ => {}
            }
            i += 1;
            continue;
        }

        match (byte, bytes.get(i + 1).copied()) {
            (b'"', _) => {
                in_string = true;
                i += 1;
            }
            (b'/', Some(b'/')) => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    if bytes[i] != b'\r' {
                        bytes[i] = b' ';
                    }
                    i += 1;
                }
            }
            (b'/', Some(b'*')) => {
                bytes[i] = b' ';
                bytes[i + 1] = b' ';
                i += 2;
                while i < bytes.len() {
                    if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        bytes[i] = b' ';
                        bytes[i + 1] = b' ';
                        i += 2;
                        break;
                    }
                    if !matches!(bytes[i], b'\n' | b'\r') {
                        bytes[i] = b' ';
                    }
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    // Only ASCII bytes were written over whole comment runs, so the result is
    // still valid UTF-8.
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Minimal cursor over already-validated JSON text.
struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> ThemeResult<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    fn skip_string(&mut self) -> ThemeResult<()> {
        self.expect(b'"')?;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(b'\\') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn skip_value(&mut self) -> ThemeResult<()> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some(b'"') => self.skip_string(),
            Some(b'{' | b'[') => {
                let mut depth = 0usize;
                loop {
                    match self.peek() {
                        None => return Err(self.error("unbalanced brackets")),
                        Some(b'"') => self.skip_string()?,
                        Some(b'{' | b'[') => {
                            depth += 1;
                            self.pos += 1;
                        }
                        Some(b'}' | b']') => {
                            depth = depth.saturating_sub(1);
                            self.pos += 1;
                            if depth == 0 {
                                return Ok(());
                            }
                        }
                        Some(_) => self.pos += 1,
                    }
                }
            }
            Some(_) => {
                while !matches!(
                    self.peek(),
                    None | Some(b',' | b'}' | b']' | b' ' | b'\t' | b'\n' | b'\r')
                ) {
                    self.pos += 1;
                }
                Ok(())
            }
        }
    }

    fn error(&self, message: &str) -> ThemeError {
        ThemeError::parse(SOURCE_NAME, format!("{message} at byte {}", self.pos))
    }
}

/// Find the `schemes` member of the root object. The last occurrence wins,
/// matching how the parser resolves duplicate keys.
fn locate_schemes(masked: &str) -> ThemeResult<SchemesLocation> {
    let mut scanner = Scanner::new(masked);
    scanner.skip_whitespace();
    scanner.expect(b'{')?;
    let after_open = scanner.pos;

    let mut found = None;
    let mut last_member_end = None;

    loop {
        scanner.skip_whitespace();
        if scanner.peek() == Some(b'}') {
            break;
        }

        let key_start = scanner.pos;
        scanner.skip_string()?;
        let key: String = serde_json::from_str(&masked[key_start..scanner.pos])
            .map_err(|e| ThemeError::parse(SOURCE_NAME, e))?;

        scanner.skip_whitespace();
        scanner.expect(b':')?;
        scanner.skip_whitespace();

        let value_start = scanner.pos;
        scanner.skip_value()?;
        if key == SCHEMES_KEY {
            found = Some(value_start..scanner.pos);
        }
        last_member_end = Some(scanner.pos);

        scanner.skip_whitespace();
        match scanner.peek() {
            Some(b',') => scanner.pos += 1,
            Some(b'}') => break,
            _ => return Err(scanner.error("expected ',' or '}'")),
        }
    }

    Ok(match found {
        Some(span) => SchemesLocation::Present(span),
        None => SchemesLocation::Absent {
            insert_at: last_member_end.unwrap_or(after_open),
            root_empty: last_member_end.is_none(),
        },
    })
}

/// The first indentation used by a member line.
fn detect_indent(masked: &str) -> String {
    masked
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .find(|indent| !indent.is_empty())
        .unwrap_or(DEFAULT_INDENT)
        .to_string()
}

/// Leading whitespace of the line containing `offset`.
fn line_indent(masked: &str, offset: usize) -> String {
    let line_start = masked[..offset].rfind('\n').map_or(0, |i| i + 1);
    masked[line_start..offset]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}
