//! # Backups
//!
//! Every write that replaces an existing file is preceded by a copy of that
//! file into the backup directory. Backups are named
//! `<file name>.<dir digest>.<sequence>.<timestamp>.bak`. The digest is taken
//! over the target's parent directory, so same-named files from different
//! directories never share a sequence. The zero-padded sequence orders backups
//! even when several are taken within the same second. After a successful
//! write only the newest `retention` backups of that file are kept.

use crate::common::errors::{ThemeError, ThemeResult};
use crate::store::atomic;
use chrono::Local;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

const BACKUP_EXTENSION: &str = "bak";
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
/// Hex characters of the parent-directory digest kept in backup names.
const DIR_DIGEST_LEN: usize = 8;

/// One backup file of a given target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub sequence: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct BackupManager {
    backup_dir: PathBuf,
    retention: usize,
}

impl BackupManager {
    pub fn new(backup_dir: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            retention,
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Copy `target` into the backup directory. A missing target needs no
    /// backup and yields `None`.
    pub fn create_backup(&self, target: &Path) -> ThemeResult<Option<PathBuf>> {
        if !target.exists() {
            return Ok(None);
        }

        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            ThemeError::backup(target, format!("cannot create {}: {e}", self.backup_dir.display()))
        })?;

        let next = self
            .list(target)?
            .last()
            .map_or(1, |entry| entry.sequence + 1);
        let backup = self.backup_dir.join(format!(
            "{}{next:06}.{}.{BACKUP_EXTENSION}",
            backup_prefix(target),
            Local::now().format(TIMESTAMP_FORMAT)
        ));

        fs::copy(target, &backup).map_err(|e| {
            ThemeError::backup(target, format!("cannot copy to {}: {e}", backup.display()))
        })?;

        log::info!("Backed up {} to {}", target.display(), backup.display());
        Ok(Some(backup))
    }

    /// Backups of `target`, oldest first.
    pub fn list(&self, target: &Path) -> ThemeResult<Vec<BackupEntry>> {
        let entries = match fs::read_dir(&self.backup_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ThemeError::backup(
                    target,
                    format!("cannot read {}: {e}", self.backup_dir.display()),
                ));
            }
        };

        let prefix = backup_prefix(target);
        let mut backups: Vec<BackupEntry> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let (sequence, timestamp) = parse_backup_name(&name, &prefix)?;
                Some(BackupEntry {
                    path: entry.path(),
                    sequence,
                    timestamp,
                })
            })
            .collect();

        backups.sort_by_key(|entry| entry.sequence);
        Ok(backups)
    }

    pub fn latest(&self, target: &Path) -> ThemeResult<Option<PathBuf>> {
        Ok(self.list(target)?.pop().map(|entry| entry.path))
    }

    /// Delete all but the newest `retention` backups. Returns how many were
    /// removed.
    pub fn rotate(&self, target: &Path) -> ThemeResult<usize> {
        let backups = self.list(target)?;
        let excess = backups.len().saturating_sub(self.retention);

        for entry in backups.iter().take(excess) {
            fs::remove_file(&entry.path).map_err(|e| {
                ThemeError::backup(target, format!("cannot remove {}: {e}", entry.path.display()))
            })?;
            log::debug!("Removed old backup {}", entry.path.display());
        }
        Ok(excess)
    }

    /// Put a backup's content back at `target`, atomically.
    pub fn restore(&self, backup: &Path, target: &Path) -> ThemeResult<()> {
        let bytes = fs::read(backup).map_err(|e| {
            ThemeError::backup(target, format!("cannot read {}: {e}", backup.display()))
        })?;
        atomic::write_atomic(target, &bytes)
            .map_err(|e| ThemeError::backup(target, format!("restore failed: {e}")))?;

        log::warn!("Restored {} from {}", target.display(), backup.display());
        Ok(())
    }
}

/// `<file name>.<dir digest>.` for `target`.
fn backup_prefix(target: &Path) -> String {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{name}.{}.", dir_digest(target))
}

fn dir_digest(target: &Path) -> String {
    let absolute = std::path::absolute(target).unwrap_or_else(|_| target.to_path_buf());
    let parent = absolute.parent().unwrap_or(Path::new(""));
    let digest = Sha256::digest(parent.to_string_lossy().as_bytes());
    digest[..DIR_DIGEST_LEN / 2]
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// `<prefix><sequence>.<timestamp>.bak` → `(sequence, timestamp)`.
fn parse_backup_name(name: &str, prefix: &str) -> Option<(u64, String)> {
    let rest = name
        .strip_prefix(prefix)?
        .strip_suffix(BACKUP_EXTENSION)?
        .strip_suffix('.')?;
    let (sequence, timestamp) = rest.split_once('.')?;
    if sequence.is_empty() || !sequence.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((sequence.parse().ok()?, timestamp.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_none, assert_ok, assert_some};
    use tempfile::TempDir;

    fn setup(retention: usize) -> (TempDir, BackupManager, PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let manager = BackupManager::new(dir.path().join("backups"), retention);
        let target = dir.path().join("themes.json");
        (dir, manager, target)
    }

    #[test]
    fn test_missing_target_needs_no_backup() {
        let (_dir, manager, target) = setup(5);
        assert_none!(assert_ok!(manager.create_backup(&target)));
        assert!(assert_ok!(manager.list(&target)).is_empty());
    }

    #[test]
    fn test_sequence_orders_backups() {
        let (_dir, manager, target) = setup(5);
        for round in 0..3 {
            fs::write(&target, format!("v{round}")).expect("write");
            assert_some!(assert_ok!(manager.create_backup(&target)));
        }

        let backups = assert_ok!(manager.list(&target));
        let sequences: Vec<u64> = backups.iter().map(|b| b.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(fs::read_to_string(&backups[2].path).expect("read"), "v2");
    }

    #[test]
    fn test_rotate_keeps_newest() {
        let (_dir, manager, target) = setup(2);
        for round in 0..4 {
            fs::write(&target, format!("v{round}")).expect("write");
            manager.create_backup(&target).expect("backup");
        }

        assert_eq!(assert_ok!(manager.rotate(&target)), 2);
        let backups = assert_ok!(manager.list(&target));
        assert_eq!(backups.len(), 2);
        assert_eq!(fs::read_to_string(&backups[0].path).expect("read"), "v2");
        assert_eq!(fs::read_to_string(&backups[1].path).expect("read"), "v3");
    }

    #[test]
    fn test_other_files_are_ignored() {
        let (_dir, manager, target) = setup(5);
        fs::create_dir_all(manager.backup_dir()).expect("dir");
        fs::write(manager.backup_dir().join("themes.json.old.000001.x.bak"), "").expect("write");
        fs::write(manager.backup_dir().join("palette.json.000001.x.bak"), "").expect("write");
        fs::write(manager.backup_dir().join("notes.txt"), "").expect("write");

        assert!(assert_ok!(manager.list(&target)).is_empty());
    }

    #[test]
    fn test_same_name_in_other_directory_keeps_own_backups() {
        let (dir, manager, target) = setup(1);
        let other_dir = dir.path().join("other");
        fs::create_dir_all(&other_dir).expect("dir");
        let other = other_dir.join("themes.json");

        fs::write(&target, "mine").expect("write");
        fs::write(&other, "theirs").expect("write");
        manager.create_backup(&target).expect("backup");
        manager.create_backup(&other).expect("backup");
        fs::write(&other, "theirs v2").expect("write");
        manager.create_backup(&other).expect("backup");

        assert_eq!(assert_ok!(manager.rotate(&other)), 1);
        let mine = assert_ok!(manager.list(&target));
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].sequence, 1);

        let latest = assert_some!(assert_ok!(manager.latest(&target)));
        assert_eq!(fs::read_to_string(latest).expect("read"), "mine");
    }

    #[test]
    fn test_restore_latest_backup() {
        let (_dir, manager, target) = setup(5);
        fs::write(&target, "good").expect("write");
        manager.create_backup(&target).expect("backup");
        fs::write(&target, "broken").expect("write");

        let latest = assert_some!(assert_ok!(manager.latest(&target)));
        assert_ok!(manager.restore(&latest, &target));
        assert_eq!(fs::read_to_string(&target).expect("read"), "good");
    }

    #[test]
    fn test_restore_from_missing_backup_fails() {
        let (dir, manager, target) = setup(5);
        let error = assert_err!(manager.restore(&dir.path().join("gone.bak"), &target));
        assert!(matches!(error, ThemeError::Backup { .. }));
    }

    #[test]
    fn test_parse_backup_name() {
        assert_eq!(
            parse_backup_name("themes.json.000012.20250101-120000.bak", "themes.json."),
            Some((12, "20250101-120000".to_string()))
        );
        assert_eq!(parse_backup_name("themes.json.bak", "themes.json."), None);
    }
}
