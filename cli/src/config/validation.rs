use super::app::AppConfig;
use super::limits::LOG_LEVELS;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid backup.retention: {configured} (min: {min_limit}, max: {max_limit})")]
    BackupRetention {
        configured: usize,
        min_limit: usize,
        max_limit: usize,
    },
    #[error("Invalid conversion.{key}: {configured} (expected 0.0 - 1.0)")]
    BlendRatio { key: &'static str, configured: f64 },
    #[error("Invalid logging.level: '{configured}'")]
    LogLevel { configured: String },
}

impl ConfigValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigValidationError::BackupRetention {
                configured,
                min_limit,
                max_limit,
            } => {
                format!(
                    "Backup retention out of range!\n\n\
                    Your configured value: {configured}\n\
                    Valid range: {min_limit} - {max_limit}\n\n\
                    Please update backup.retention in config.toml to a value between {min_limit} and {max_limit}."
                )
            }
            ConfigValidationError::BlendRatio { key, configured } => {
                format!(
                    "Blend ratio out of range!\n\n\
                    Your configured value: {configured}\n\
                    Valid range: 0.0 - 1.0\n\n\
                    Please update conversion.{key} in config.toml."
                )
            }
            ConfigValidationError::LogLevel { configured } => {
                format!(
                    "Unknown log level '{configured}'.\n\n\
                    Use one of: trace, debug, info, warn, error."
                )
            }
        }
    }
}

/// Accept a level name from [`LOG_LEVELS`], in any case.
pub fn validate_log_level(level: &str) -> Result<(), ConfigValidationError> {
    if LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ConfigValidationError::LogLevel {
            configured: level.to_string(),
        })
    }
}

/// Configuration loading result
#[derive(Debug)]
pub enum ConfigLoadResult {
    Success(Box<AppConfig>),
    LoadError(String),
    DeserializeError(String),
}
