use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::model::{display_name, size_mb, FileCategory, FileRecord};
use crate::scan::{CancelToken, StatusHandle};

/// Files larger than this are not hashed; the cost outweighs the benefit.
pub const MAX_HASH_SIZE_MB: f64 = 500.0;

struct HashedFile {
    index: usize,
    key: String,
    size_mb: f64,
}

/// Flag every file whose content digest and quantized size match an
/// earlier file. The first file encountered in walk order is canonical and
/// is never itself flagged. Unreadable files are silently excluded.
pub fn find_duplicates(
    files: &[PathBuf],
    status: &StatusHandle,
    cancel: &CancelToken,
) -> Vec<FileRecord> {
    // Digest on the worker pool, tagged with discovery indices. Canonical
    // selection happens in the ordered merge below, so completion order
    // never influences which path wins.
    let hashed: Vec<Option<HashedFile>> = files
        .par_iter()
        .enumerate()
        .map(|(index, path)| {
            if cancel.is_cancelled() {
                return None;
            }
            let mb = size_mb(path);
            if mb == 0.0 || mb > MAX_HASH_SIZE_MB {
                return None;
            }
            let digest = hash_file(path).ok()?;
            Some(HashedFile {
                index,
                key: composite_key(&digest, mb),
                size_mb: mb,
            })
        })
        .collect();

    let mut canonical: HashMap<String, &Path> = HashMap::new();
    let mut records = Vec::new();

    for (index, slot) in hashed.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        status.update(
            index as u64,
            format!("Scanning duplicates: {}", display_name(&files[index])),
        );
        let Some(hashed) = slot else {
            continue;
        };
        let path = files[hashed.index].as_path();
        match canonical.get(&hashed.key) {
            Some(first) => records.push(FileRecord::new(
                FileCategory::Duplicate,
                hashed.index,
                path,
                hashed.size_mb,
                format!("Duplicate of: {}", display_name(first)),
            )),
            None => {
                canonical.insert(hashed.key.clone(), path);
            }
        }
    }

    records
}

/// Digest and size rounded to millibyte precision, combined so truncated
/// digests or size quantization cannot merge distinct files.
fn composite_key(digest: &str, size_mb: f64) -> String {
    format!("{digest}_{}", (size_mb * 1000.0).round() as u64)
}

fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0_u8; 64 * 1024];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::find_duplicates;
    use crate::model::FileCategory;
    use crate::scan::{CancelToken, StatusHandle};

    fn detect(files: &[PathBuf]) -> Vec<crate::model::FileRecord> {
        find_duplicates(files, &StatusHandle::default(), &CancelToken::default())
    }

    #[test]
    fn later_file_is_flagged_against_first_visited() {
        let temp = TempDir::new().expect("tempdir");
        let a = temp.path().join("a.bin");
        let b = temp.path().join("b.bin");
        let c = temp.path().join("c.bin");
        fs::write(&a, b"same-content").expect("write a");
        fs::write(&b, b"same-content").expect("write b");
        fs::write(&c, b"other-content").expect("write c");

        let records = detect(&[a, b.clone(), c]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, FileCategory::Duplicate);
        assert_eq!(records[0].path, b);
        assert_eq!(records[0].id, "d1");
        assert_eq!(records[0].reason, "Duplicate of: a.bin");
        assert!(records[0].selected);
    }

    #[test]
    fn zero_byte_files_never_participate() {
        let temp = TempDir::new().expect("tempdir");
        let a = temp.path().join("a.dat");
        let b = temp.path().join("b.dat");
        fs::write(&a, b"").expect("write a");
        fs::write(&b, b"").expect("write b");

        assert!(detect(&[a, b]).is_empty());
    }

    #[test]
    fn unreadable_files_are_silently_excluded() {
        let temp = TempDir::new().expect("tempdir");
        let a = temp.path().join("a.bin");
        fs::write(&a, b"payload").expect("write a");
        let ghost = temp.path().join("ghost.bin");

        assert!(detect(&[ghost, a]).is_empty());
    }

    #[test]
    fn equal_content_three_ways_flags_all_but_the_first() {
        let temp = TempDir::new().expect("tempdir");
        let paths: Vec<_> = ["x.bin", "y.bin", "z.bin"]
            .iter()
            .map(|name| {
                let path = temp.path().join(name);
                fs::write(&path, b"threefold").expect("write");
                path
            })
            .collect();

        let records = detect(&paths);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.reason == "Duplicate of: x.bin"));
    }
}
