use super::validation::{ConfigValidationError, validate_log_level};
use super::{LoggingConfig, limits::*, setup, setup::SetupError};
use engine::backup::BackupManager;
use engine::converter::DerivationConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    collection: CollectionConfig,
    #[serde(default)]
    backup: BackupConfig,
    #[serde(default)]
    conversion: ConversionConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CollectionConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct BackupConfig {
    dir: Option<String>,
    retention: Option<usize>,
}

/// Blend ratios used when a target slot has no direct source
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConversionConfig {
    disabled_blend: Option<f64>,
    border_blend: Option<f64>,
    bright_blend: Option<f64>,
}

impl AppConfig {
    /// Validate the configuration against defined limits
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        let retention = self.backup_retention();
        if !(MIN_BACKUP_RETENTION..=MAX_BACKUP_RETENTION).contains(&retention) {
            errors.push(ConfigValidationError::BackupRetention {
                configured: retention,
                min_limit: MIN_BACKUP_RETENTION,
                max_limit: MAX_BACKUP_RETENTION,
            });
        }

        let derivation = self.derivation_config();
        for (key, ratio) in [
            ("disabled_blend", derivation.disabled_blend),
            ("border_blend", derivation.border_blend),
            ("bright_blend", derivation.bright_blend),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                errors.push(ConfigValidationError::BlendRatio {
                    key,
                    configured: ratio,
                });
            }
        }

        if let Err(error) = validate_log_level(self.logging.level()) {
            errors.push(error);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Configured collection path, or `<config dir>/themes.json`
    pub fn collection_path(&self) -> Result<PathBuf, SetupError> {
        match non_empty(&self.collection.path) {
            Some(path) => Ok(PathBuf::from(path)),
            None => setup::get_default_collection_path(),
        }
    }

    /// Configured backup directory, or `<config dir>/backups`
    pub fn backup_dir(&self) -> Result<PathBuf, SetupError> {
        match non_empty(&self.backup.dir) {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => setup::get_backup_dir(),
        }
    }

    pub fn backup_retention(&self) -> usize {
        self.backup.retention.unwrap_or(DEFAULT_BACKUP_RETENTION)
    }

    pub fn backup_manager(&self) -> Result<BackupManager, SetupError> {
        Ok(BackupManager::new(self.backup_dir()?, self.backup_retention()))
    }

    pub fn derivation_config(&self) -> DerivationConfig {
        let defaults = DerivationConfig::default();
        DerivationConfig {
            disabled_blend: self.conversion.disabled_blend.unwrap_or(defaults.disabled_blend),
            border_blend: self.conversion.border_blend.unwrap_or(defaults.border_blend),
            bright_blend: self.conversion.bright_blend.unwrap_or(defaults.bright_blend),
        }
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert_ok!(config.validate());
        assert_eq!(config.backup_retention(), DEFAULT_BACKUP_RETENTION);
        assert_eq!(config.derivation_config(), DerivationConfig::default());
    }

    #[test]
    fn test_every_problem_is_reported() {
        let config = AppConfig {
            backup: BackupConfig {
                dir: None,
                retention: Some(0),
            },
            conversion: ConversionConfig {
                disabled_blend: Some(1.5),
                border_blend: Some(-0.1),
                bright_blend: None,
            },
            ..AppConfig::default()
        };

        let errors = assert_err!(config.validate());
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ConfigValidationError::BackupRetention { configured: 0, .. }));
        assert!(errors[1].user_message().contains("conversion.disabled_blend"));
    }

    #[test]
    fn test_empty_paths_fall_back_to_defaults() {
        let config = AppConfig {
            collection: CollectionConfig {
                path: Some("  ".to_string()),
            },
            backup: BackupConfig {
                dir: Some("/tmp/themeshift-backups".to_string()),
                retention: None,
            },
            ..AppConfig::default()
        };

        if let Ok(default_path) = setup::get_default_collection_path() {
            assert_eq!(config.collection_path().ok(), Some(default_path));
        }
        assert_eq!(config.backup_dir().ok(), Some(PathBuf::from("/tmp/themeshift-backups")));
    }
}
