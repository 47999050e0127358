use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

pub mod app;
pub mod defaults;
pub mod limits;
pub mod setup;
pub mod validation;

pub use app::AppConfig;
pub use validation::{ConfigLoadResult, ConfigValidationError};

use crate::error::{AppError, AppResult};

/// Load configuration from the embedded defaults, the user config file and
/// the environment, later sources overriding earlier ones.
///
/// An explicit `path` must exist; the standard location is optional.
pub fn load_config(path: Option<&Path>) -> ConfigLoadResult {
    dotenv::dotenv().ok();

    let mut builder =
        Config::builder().add_source(File::from_str(defaults::DEFAULT_CONFIG, FileFormat::Toml));

    builder = match path {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => match setup::get_config_file_path() {
            Ok(default_path) => builder.add_source(File::from(default_path).required(false)),
            Err(e) => {
                log::debug!("No standard config location: {e}");
                builder
            }
        },
    };

    let env_source = Environment::with_prefix(defaults::ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true);

    let config = match builder.add_source(env_source).build() {
        Ok(config) => config,
        Err(e) => {
            return ConfigLoadResult::LoadError(format!(
                "Configuration loading failed: {e}. Please check your config.toml file and environment variables."
            ));
        }
    };

    match config.try_deserialize::<AppConfig>() {
        Ok(app_config) => {
            if let Err(validation_errors) = app_config.validate() {
                let error_messages: Vec<String> =
                    validation_errors.iter().map(|e| e.user_message()).collect();
                return ConfigLoadResult::DeserializeError(format!(
                    "Configuration validation failed:\n{}",
                    error_messages.join("\n\n")
                ));
            }
            ConfigLoadResult::Success(Box::new(app_config))
        }
        Err(e) => ConfigLoadResult::DeserializeError(format!("Failed to deserialize config: {e}")),
    }
}

impl ConfigLoadResult {
    /// Unreadable files map to an I/O failure, bad values to a validation
    /// failure.
    pub fn into_result(self) -> AppResult<AppConfig> {
        match self {
            ConfigLoadResult::Success(config) => Ok(*config),
            ConfigLoadResult::LoadError(message) => Err(AppError::ConfigLoad(message)),
            ConfigLoadResult::DeserializeError(message) => Err(AppError::Config(message)),
        }
    }
}

/// Additional logging configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct LoggingConfig {
    level: Option<String>,
    file: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref().filter(|file| !file.trim().is_empty())
    }
}
