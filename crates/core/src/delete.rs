use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::model::{DeleteOutcome, FileRecord};

/// Secure wipe overwrites at most this many leading bytes. Larger files
/// keep their tail; a partial wipe, not a guaranteed erase.
pub const SECURE_WIPE_BYTES: u64 = 1_048_576;

/// Delete the records named by `ids` from disk and from the store. Ids not
/// present in the store are skipped with no outcome entry. Each id is
/// processed independently; a failure is reported once, with the
/// underlying message, and leaves its record in the store.
pub fn delete_files(
    store: &mut Vec<FileRecord>,
    ids: &[String],
    secure: bool,
) -> Vec<DeleteOutcome> {
    let mut outcomes = Vec::new();
    for id in ids {
        let Some(position) = store.iter().position(|record| &record.id == id) else {
            continue;
        };
        let path = store[position].path.clone();
        match remove_file(&path, secure) {
            Ok(()) => {
                store.remove(position);
                info!("deleted {}", path.display());
                outcomes.push(DeleteOutcome::succeeded(id));
            }
            Err(err) => outcomes.push(DeleteOutcome::failed(id, err.to_string())),
        }
    }
    outcomes
}

fn remove_file(path: &Path, secure: bool) -> Result<()> {
    if secure {
        secure_overwrite(path)?;
    }
    fs::remove_file(path).with_context(|| format!("failed to delete {}", path.display()))
}

/// Truncate the file and rewrite the first `min(size, 1 MiB)` bytes with
/// zeros, so whatever survives a failed unlink is already zeroed.
fn secure_overwrite(path: &Path) -> Result<()> {
    let size = fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();
    let wipe_len = size.min(SECURE_WIPE_BYTES) as usize;
    let mut file =
        File::create(path).with_context(|| format!("failed to open {} for wipe", path.display()))?;
    file.write_all(&vec![0_u8; wipe_len])
        .with_context(|| format!("failed to wipe {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::{delete_files, secure_overwrite, SECURE_WIPE_BYTES};
    use crate::model::{size_mb, FileCategory, FileRecord};

    fn record(category: FileCategory, index: usize, path: &Path) -> FileRecord {
        FileRecord::new(category, index, path, size_mb(path), "test".to_string())
    }

    #[test]
    fn successful_delete_removes_file_and_record() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("junk.tmp");
        fs::write(&path, b"junk").expect("write");

        let mut store = vec![record(FileCategory::Temp, 0, &path)];
        let outcomes = delete_files(&mut store, &["t0".to_string()], false);

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success);
        assert!(store.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn unknown_id_produces_no_outcome_and_no_error() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("keep.tmp");
        fs::write(&path, b"keep").expect("write");

        let mut store = vec![record(FileCategory::Temp, 0, &path)];
        let outcomes = delete_files(&mut store, &["t99".to_string()], false);

        assert!(outcomes.is_empty());
        assert_eq!(store.len(), 1);
        assert!(path.exists());
    }

    #[test]
    fn failed_delete_reports_error_and_keeps_record() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("already-gone.tmp");
        fs::write(&path, b"x").expect("write");

        let mut store = vec![record(FileCategory::Temp, 0, &path)];
        fs::remove_file(&path).expect("remove out from under");

        let outcomes = delete_files(&mut store, &["t0".to_string()], false);
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].success);
        assert!(outcomes[0].error.is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn deleting_the_same_id_twice_yields_one_outcome() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("once.tmp");
        fs::write(&path, b"x").expect("write");

        let mut store = vec![record(FileCategory::Temp, 0, &path)];
        let ids = vec!["t0".to_string()];
        assert_eq!(delete_files(&mut store, &ids, false).len(), 1);
        assert!(delete_files(&mut store, &ids, false).is_empty());
    }

    #[test]
    fn secure_wipe_zeroes_small_files_in_place() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("secret.txt");
        fs::write(&path, b"confidential").expect("write");

        secure_overwrite(&path).expect("wipe");
        let content = fs::read(&path).expect("read back");
        assert_eq!(content, vec![0_u8; b"confidential".len()]);
    }

    #[test]
    fn secure_wipe_caps_large_files_at_one_megabyte() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("big.bin");
        fs::write(&path, vec![0xAB_u8; SECURE_WIPE_BYTES as usize + 4096]).expect("write");

        secure_overwrite(&path).expect("wipe");
        // File::create truncates first, so the rewritten file is exactly
        // the capped length and all zeros.
        let content = fs::read(&path).expect("read back");
        assert_eq!(content.len(), SECURE_WIPE_BYTES as usize);
        assert!(content.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn secure_delete_removes_the_file() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("wipe-me.tmp");
        fs::write(&path, b"sensitive").expect("write");

        let mut store = vec![record(FileCategory::Temp, 0, &path)];
        let outcomes = delete_files(&mut store, &["t0".to_string()], true);
        assert!(outcomes[0].success);
        assert!(!path.exists());
    }
}
