use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of a single validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The value is not in any accepted textual form.
    InvalidFormat,
    /// A numeric component lies outside `0..=255`.
    OutOfRange,
    /// A mandatory color slot is absent.
    MissingSlot,
    /// A theme name is empty or otherwise unusable.
    InvalidName,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValidationErrorKind::InvalidFormat => "invalid format",
            ValidationErrorKind::OutOfRange => "out of range",
            ValidationErrorKind::MissingSlot => "missing slot",
            ValidationErrorKind::InvalidName => "invalid name",
        };
        f.write_str(label)
    }
}

/// A single well-formed-but-wrong value, with enough context to render a
/// precise message (which slot, which value).
///
/// Validation never stops at the first problem: record validators return a
/// `Vec<ValidationError>` so that every broken slot can be shown at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub slot: Option<String>,
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind) -> Self {
        Self {
            kind,
            slot: None,
            value: None,
        }
    }

    pub fn invalid_format(value: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::InvalidFormat).with_value(value)
    }

    pub fn out_of_range(value: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::OutOfRange).with_value(value)
    }

    pub fn missing_slot(slot: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::MissingSlot).with_slot(slot)
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.slot, &self.value) {
            (Some(slot), Some(value)) => write!(f, "{slot}: {} ('{value}')", self.kind),
            (Some(slot), None) => write!(f, "{slot}: {}", self.kind),
            (None, Some(value)) => write!(f, "{} ('{value}')", self.kind),
            (None, None) => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors produced by the theme engine.
///
/// Every variant carries the structured context (path, theme name, slot,
/// offending value) required to render a precise message to the user. Parse
/// and validation problems are ordinary values: nothing in the engine uses
/// errors for control flow, callers decide whether to reject or fall back.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Parse`] - Source bytes are not well-formed for the expected format
/// - [`Validation`] - Well-formed but semantically invalid (bad hex, missing slot)
/// - [`UnknownColorName`] - A widget-theme color token is not in the named-color table
///
/// ## Collection Errors
/// - [`NotFound`] - A named theme does not exist
/// - [`NameConflict`] - A target theme name is already taken
///
/// ## Storage Errors
/// - [`Io`] - Disk or permission failures
/// - [`Backup`] - Backup creation or restore-on-failure could not complete
/// - [`OverwriteDeclined`] - The collaborator refused a destructive write
/// - [`Cancelled`] - A queued write was cancelled before it started
///
/// # Examples
///
/// ```no_run
/// use engine::common::errors::ThemeError;
/// use engine::model::terminal::ThemeCollection;
///
/// fn report(bytes: &[u8]) {
///     match ThemeCollection::load(bytes) {
///         Ok(collection) => println!("{} themes", collection.len()),
///         Err(ThemeError::Validation { context, errors }) => {
///             for error in errors {
///                 eprintln!("{context}: {error}");
///             }
///         }
///         Err(other) => eprintln!("{other}"),
///     }
/// }
/// ```
///
/// [`Parse`]: ThemeError::Parse
/// [`Validation`]: ThemeError::Validation
/// [`UnknownColorName`]: ThemeError::UnknownColorName
/// [`NotFound`]: ThemeError::NotFound
/// [`NameConflict`]: ThemeError::NameConflict
/// [`Io`]: ThemeError::Io
/// [`Backup`]: ThemeError::Backup
/// [`OverwriteDeclined`]: ThemeError::OverwriteDeclined
/// [`Cancelled`]: ThemeError::Cancelled
#[derive(Debug, Error)]
pub enum ThemeError {
    /// Source bytes could not be parsed.
    ///
    /// # Fields
    /// - `source_name`: What was being parsed (a path, or a format label)
    /// - `message`: Parser diagnostic, including line/column when available
    ///
    /// # Recovery
    /// - Fix the file syntax; the engine never guesses at malformed input
    #[error("Failed to parse {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Input parsed but failed semantic validation.
    ///
    /// # Fields
    /// - `context`: The record or file the errors belong to
    /// - `errors`: Every problem found, not just the first
    ///
    /// # Recovery
    /// - Render all errors to the user and let them correct the slots
    #[error("Validation failed for {context}: {}", format_validation_errors(.errors))]
    Validation {
        context: String,
        errors: Vec<ValidationError>,
    },

    /// No theme with the given name exists.
    #[error("Theme not found: '{name}'")]
    NotFound { name: String },

    /// The requested name is already used by another theme.
    ///
    /// Names are compared case-sensitively with an exact match.
    #[error("A theme named '{name}' already exists")]
    NameConflict { name: String },

    /// A widget-theme color token is neither hex nor a known color name.
    #[error("Unknown color name: '{token}'")]
    UnknownColorName { token: String },

    /// File system failure.
    ///
    /// # Recovery
    /// - Writes are atomic (temp file + rename), so the target file is
    ///   untouched; check permissions and free space and retry
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backup creation or restore failed.
    ///
    /// This is fatal for the operation that triggered it and is never
    /// retried automatically.
    #[error("Backup failure for '{}': {message}", .path.display())]
    Backup { path: PathBuf, message: String },

    /// The overwrite confirmation callback declined a destructive write.
    #[error("Overwrite of '{}' was declined", .path.display())]
    OverwriteDeclined { path: PathBuf },

    /// A queued write was cancelled before it began.
    #[error("Write to '{}' was cancelled before it started", .path.display())]
    Cancelled { path: PathBuf },
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ThemeError {
    pub fn parse(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn validation(context: impl Into<String>, errors: Vec<ValidationError>) -> Self {
        Self::Validation {
            context: context.into(),
            errors,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn backup(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Backup {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the error stems from the input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ThemeError::Parse { .. }
                | ThemeError::Validation { .. }
                | ThemeError::NotFound { .. }
                | ThemeError::NameConflict { .. }
                | ThemeError::UnknownColorName { .. }
                | ThemeError::OverwriteDeclined { .. }
        )
    }

    /// Multi-line message suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            ThemeError::Validation { context, errors } => {
                let mut message = format!("{context} has {} problem(s):", errors.len());
                for error in errors {
                    message.push_str(&format!("\n  - {error}"));
                }
                message
            }
            ThemeError::NameConflict { name } => format!(
                "A theme named '{name}' already exists.\n\n\
                Please choose a different name."
            ),
            ThemeError::Backup { path, message } => format!(
                "Could not back up or restore '{}'.\n\n\
                Reason: {message}\n\n\
                The file may need to be restored by hand from the backup directory.",
                path.display()
            ),
            other => other.to_string(),
        }
    }
}

impl From<ValidationError> for ThemeError {
    fn from(error: ValidationError) -> Self {
        let context = error.slot.clone().unwrap_or_else(|| "color".to_string());
        ThemeError::Validation {
            context,
            errors: vec![error],
        }
    }
}

/// Result type alias for engine operations
pub type ThemeResult<T> = Result<T, ThemeError>;
