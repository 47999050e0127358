/// Backups kept per file when nothing is configured
pub const DEFAULT_BACKUP_RETENTION: usize = 5;

/// At least one backup must survive rotation so a failed write can be undone
pub const MIN_BACKUP_RETENTION: usize = 1;

/// Maximum reasonable number of backups per file
pub const MAX_BACKUP_RETENTION: usize = 100;

/// Log levels accepted by `logging.level` and `--log-level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
