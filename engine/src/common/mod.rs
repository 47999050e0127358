pub mod errors;

pub use errors::{ThemeError, ThemeResult, ValidationError, ValidationErrorKind};
