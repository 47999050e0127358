use crate::common::errors::{ValidationError, ValidationErrorKind};

/// Core validation trait that all validators must implement.
///
/// This trait provides a consistent interface for validating data across
/// the engine. Validators can be composed and chained together for
/// complex validation scenarios.
///
/// # Type Parameters
///
/// * `T` - The type of data being validated (can be unsized like `str`)
///
/// # Examples
///
/// ```
/// use engine::validation::Validator;
///
/// struct NonEmpty;
/// impl Validator<str> for NonEmpty {
///     type Error = String;
///
///     fn validate(&self, input: &str) -> Result<(), Self::Error> {
///         if input.is_empty() {
///             Err("Input cannot be empty".to_string())
///         } else {
///             Ok(())
///         }
///     }
/// }
/// ```
pub trait Validator<T: ?Sized> {
    type Error;

    /// Validate the input and return Ok(()) if valid, or Err with validation error
    fn validate(&self, input: &T) -> Result<(), Self::Error>;
}

/// Maximum theme name length in characters
pub const MAX_THEME_NAME_LEN: usize = 100;

/// Validator for theme names.
///
/// Display names may contain spaces and punctuation ("Gruvbox Dark (hard)"),
/// so only emptiness, length and control characters are rejected.
pub struct ThemeNameValidator;

impl Validator<str> for ThemeNameValidator {
    type Error = ValidationError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        let invalid = |reason: &str| {
            Err(ValidationError::new(ValidationErrorKind::InvalidName)
                .with_slot("name")
                .with_value(format!("{input} ({reason})")))
        };

        if input.trim().is_empty() {
            return invalid("name cannot be empty");
        }

        if input.chars().count() > MAX_THEME_NAME_LEN {
            return invalid("name too long");
        }

        if input.chars().any(char::is_control) {
            return invalid("name contains control characters");
        }

        Ok(())
    }
}
