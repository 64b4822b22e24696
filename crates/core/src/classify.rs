use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{age_days, size_mb, FileCategory, FileRecord};
use crate::scan::{CancelToken, StatusHandle};

/// Extensions (without the dot, lowercased) treated as temp or cache
/// artifacts, including editor swap files.
const TEMP_EXTENSIONS: &[&str] = &["tmp", "temp", "bak", "old", "cache", "swp", "swo"];

/// Exact lowercased base names of OS metadata droppings.
const TEMP_FILENAMES: &[&str] = &["thumbs.db", "desktop.ini", ".ds_store", "ehthumbs.db"];

/// Coarse substring markers: any parent path containing one of these is a
/// temp/cache location. "temp" anywhere in a segment qualifies on purpose.
const TEMP_DIR_MARKERS: &[&str] = &["/temp", "\\temp", "npm-cache", ".cache", "__pycache__"];

pub fn collect_log_records(
    files: &[PathBuf],
    status: &StatusHandle,
    cancel: &CancelToken,
) -> Vec<FileRecord> {
    status.set_message("Scanning log files...");
    let mut records = Vec::new();
    for (index, path) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        status.set_progress(index as u64);
        let name = lower_name(path);
        if is_log_name(&name) {
            records.push(FileRecord::new(
                FileCategory::Log,
                index,
                path,
                size_mb(path),
                format!("Log file ({} days old)", age_days(path)),
            ));
        }
    }
    records
}

pub fn collect_temp_records(
    files: &[PathBuf],
    status: &StatusHandle,
    cancel: &CancelToken,
) -> Vec<FileRecord> {
    status.set_message("Scanning temp & cache...");
    let mut records = Vec::new();
    for (index, path) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        status.set_progress(index as u64);
        if is_temp_file(path) {
            records.push(FileRecord::new(
                FileCategory::Temp,
                index,
                path,
                size_mb(path),
                "Temp / Cache file".to_string(),
            ));
        }
    }
    records
}

pub fn collect_empty_records(
    files: &[PathBuf],
    status: &StatusHandle,
    cancel: &CancelToken,
) -> Vec<FileRecord> {
    status.set_message("Scanning empty files...");
    let mut records = Vec::new();
    for (index, path) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        status.set_progress(index as u64);
        // Re-stat at classification time; a stat failure excludes the file.
        let Ok(metadata) = fs::metadata(path) else {
            continue;
        };
        if metadata.len() == 0 {
            records.push(FileRecord::new(
                FileCategory::Empty,
                index,
                path,
                0.0,
                "Empty file".to_string(),
            ));
        }
    }
    records
}

/// Matches rotated logs (`.log`, `.log.1`), npm/yarn failure logs, and
/// crash dump naming conventions. `name` must already be lowercased.
pub fn is_log_name(name: &str) -> bool {
    if name.ends_with(".log") {
        return true;
    }
    if let Some(suffix) = name.rfind(".log.").map(|at| &name[at + 5..]) {
        if !suffix.is_empty() && suffix.bytes().all(|byte| byte.is_ascii_digit()) {
            return true;
        }
    }
    ["npm-debug", "yarn-error", "crash"]
        .iter()
        .any(|marker| name.contains(marker))
}

pub fn is_temp_file(path: &Path) -> bool {
    let name = lower_name(path);
    if name.ends_with('~') || TEMP_FILENAMES.contains(&name.as_str()) {
        return true;
    }

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());
    if extension.is_some_and(|ext| TEMP_EXTENSIONS.contains(&ext.as_str())) {
        return true;
    }

    let Some(parent) = path.parent() else {
        return false;
    };
    let dir = parent.to_string_lossy().to_lowercase();
    TEMP_DIR_MARKERS.iter().any(|marker| dir.contains(marker))
}

fn lower_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::{
        collect_empty_records, collect_log_records, collect_temp_records, is_log_name,
        is_temp_file,
    };
    use crate::scan::{CancelToken, StatusHandle};

    #[test]
    fn log_names_cover_rotation_and_dump_conventions() {
        assert!(is_log_name("server.log"));
        assert!(is_log_name("error.log"));
        assert!(is_log_name("server.log.12"));
        assert!(is_log_name("npm-debug.txt"));
        assert!(is_log_name("yarn-error.1"));
        assert!(is_log_name("app-crash-2024.dmp"));
        assert!(!is_log_name("server.log.backup"));
        assert!(!is_log_name("catalog.txt"));
        assert!(!is_log_name("changelog"));
    }

    #[test]
    fn temp_matches_extension_filename_and_dir_marker() {
        assert!(is_temp_file(Path::new("/home/u/report.bak")));
        assert!(is_temp_file(Path::new("/home/u/.article.txt.swp")));
        assert!(is_temp_file(Path::new("/home/u/draft.txt~")));
        assert!(is_temp_file(Path::new("/home/u/Thumbs.db")));
        assert!(is_temp_file(Path::new("/home/u/.cache/pip/wheel.whl")));
        assert!(is_temp_file(Path::new("/proj/__pycache__/mod.pyc")));
        // Coarse on purpose: "temp" anywhere in the directory path matches.
        assert!(is_temp_file(Path::new("/data/template-sets/a.txt")));
        assert!(!is_temp_file(Path::new("/home/u/report.txt")));
    }

    #[test]
    fn empty_pass_restats_and_skips_stat_failures() {
        let temp = TempDir::new().expect("tempdir");
        let empty = temp.path().join("zero.dat");
        let full = temp.path().join("one.dat");
        fs::write(&empty, b"").expect("write empty");
        fs::write(&full, b"1").expect("write full");
        let ghost = temp.path().join("ghost.dat");

        let files = vec![empty.clone(), full, ghost];
        let records =
            collect_empty_records(&files, &StatusHandle::default(), &CancelToken::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, empty);
        assert_eq!(records[0].id, "e0");
        assert!(!records[0].selected);
    }

    #[test]
    fn log_pass_embeds_age_in_reason() {
        let temp = TempDir::new().expect("tempdir");
        let log = temp.path().join("debug.log");
        fs::write(&log, b"line").expect("write");

        let files = vec![log];
        let records =
            collect_log_records(&files, &StatusHandle::default(), &CancelToken::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason, "Log file (0 days old)");
        assert!(records[0].selected);
    }

    #[test]
    fn nonzero_metadata_file_is_temp_but_not_empty() {
        let temp = TempDir::new().expect("tempdir");
        let thumbs = temp.path().join("thumbs.db");
        fs::write(&thumbs, b"not empty").expect("write");

        let files: Vec<PathBuf> = vec![thumbs];
        let status = StatusHandle::default();
        let cancel = CancelToken::default();
        assert_eq!(collect_temp_records(&files, &status, &cancel).len(), 1);
        assert!(collect_empty_records(&files, &status, &cancel).is_empty());
    }
}
