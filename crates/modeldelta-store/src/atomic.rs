//! Atomic write primitives
//!
//! Uses temp→rename so readers never see a partial snapshot file

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix of in-flight temp files; directory scans skip these.
pub const TEMP_SUFFIX: &str = ".tmp";

fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(TEMP_SUFFIX);
    target.with_file_name(name)
}

/// Atomically write bytes to a file
///
/// Creates the parent directory if needed.
///
/// # Errors
///
/// Returns `ERR_IO` if the directory, temp file or rename fails.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error("create_snapshot_dir", e))?;
    }

    let temp_path = temp_path_for(target_path);
    fs::write(&temp_path, content).map_err(|e| io_error("write_snapshot_temp", e))?;
    fs::rename(&temp_path, target_path).map_err(|e| io_error("rename_snapshot_temp", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("Doc").join("001.json");

        atomic_write(&target, b"{}").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"{}");
    }

    #[test]
    fn test_no_tmp_files_after_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("001.json");

        atomic_write(&target, b"clean").unwrap();

        let tmp_count = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|s| s.ends_with(TEMP_SUFFIX))
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(tmp_count, 0);
    }

    #[test]
    fn test_temp_path_keeps_extension() {
        let temp = temp_path_for(Path::new("/x/001_a.json"));
        assert_eq!(temp, Path::new("/x/001_a.json.tmp"));
    }
}
