use crate::config::setup::SetupError;
use engine::common::ThemeError;

/// Process exit code for a successful run.
pub const EXIT_SUCCESS: u8 = 0;
/// Process exit code when the input or the request is invalid.
pub const EXIT_VALIDATION: u8 = 1;
/// Process exit code when the environment failed (disk, backups, config file).
pub const EXIT_IO: u8 = 2;

/// Application-wide error types for the themeshift command line.
///
/// Every failure of a run ends up here and is mapped to a process exit code
/// by [`AppError::exit_code`].
///
/// # Error Categories
///
/// ## Input Errors (exit code 1)
/// - [`Theme`] with an input cause - parse, validation, unknown theme or color,
///   declined overwrite
/// - [`Config`] - configuration values out of range or of the wrong type
/// - [`Usage`] - arguments that parse but cannot be acted on
///
/// ## Environment Errors (exit code 2)
/// - [`Theme`] with an environment cause - I/O and backup failures
/// - [`ConfigLoad`] - configuration file missing or unreadable
/// - [`Setup`] - no usable configuration directory
///
/// [`Theme`]: AppError::Theme
/// [`Config`]: AppError::Config
/// [`Usage`]: AppError::Usage
/// [`ConfigLoad`]: AppError::ConfigLoad
/// [`Setup`]: AppError::Setup
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Failure reported by the theme engine.
    #[error(transparent)]
    Theme(#[from] ThemeError),

    /// Configuration parsed but holds invalid values.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Configuration could not be read.
    #[error("Configuration Error: {0}")]
    ConfigLoad(String),

    #[error(transparent)]
    Setup(#[from] SetupError),

    /// The request is incomplete, such as a missing path for a single-file format.
    #[error("Usage Error: {0}")]
    Usage(String),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Theme(error) if error.is_input_error() => EXIT_VALIDATION,
            AppError::Theme(_) => EXIT_IO,
            AppError::Config(_) | AppError::Usage(_) => EXIT_VALIDATION,
            AppError::ConfigLoad(_) | AppError::Setup(_) => EXIT_IO,
        }
    }

    /// Message for the terminal, with the path, slot and value involved.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Theme(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
