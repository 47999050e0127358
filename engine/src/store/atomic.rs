//! Temp-file + rename writes.
//!
//! Content is written to a hidden sibling of the target (`.<name>.tmp`),
//! flushed and synced, then renamed over the target. A reader sees either the
//! old file or the new one, and a failure at any step leaves the target as it
//! was.

use crate::common::errors::{ThemeError, ThemeResult};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// The temp file used while writing `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.tmp"))
}

pub fn write_atomic(path: &Path, bytes: &[u8]) -> ThemeResult<()> {
    write_atomic_with(path, |writer| writer.write_all(bytes))
}

/// Stream content through `write` into the temp file, then rename it over
/// `path`. The temp file is removed on any failure.
pub fn write_atomic_with<F>(path: &Path, write: F) -> ThemeResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let temp = temp_path(path);

    let result = (|| -> io::Result<()> {
        let file = File::create(&temp)?;
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);
        fs::rename(&temp, path)
    })();

    if let Err(error) = result {
        if temp.is_file() {
            if let Err(cleanup) = fs::remove_file(&temp) {
                log::warn!("Failed to remove temp file {}: {cleanup}", temp.display());
            }
        }
        return Err(ThemeError::io(path, error));
    }

    log::debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};
    use tempfile::TempDir;

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp = temp_path(Path::new("/config/themes.json"));
        assert_eq!(temp, PathBuf::from("/config/.themes.json.tmp"));
    }

    #[test]
    fn test_no_temp_file_left_on_success() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("themes.json");

        assert_ok!(write_atomic(&path, b"{}"));
        assert_eq!(fs::read(&path).expect("read"), b"{}");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_failure_mid_write_keeps_original() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("themes.json");
        fs::write(&path, b"original").expect("seed");

        let result = write_atomic_with(&path, |writer| {
            writer.write_all(b"half of the new con")?;
            Err(io::Error::other("disk full"))
        });

        let error = assert_err!(result);
        assert!(matches!(error, ThemeError::Io { .. }));
        assert_eq!(fs::read(&path).expect("read"), b"original");
        assert!(!temp_path(&path).exists());
    }
}
