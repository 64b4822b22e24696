use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const REPORT_VERSION: &str = "1.0.0";

const BYTES_PER_MB: f64 = 1_048_576.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Duplicate,
    Log,
    Temp,
    Empty,
}

impl FileCategory {
    /// Single-letter prefix used to build record ids (`d12`, `l3`, ...).
    pub fn tag(&self) -> char {
        match self {
            FileCategory::Duplicate => 'd',
            FileCategory::Log => 'l',
            FileCategory::Temp => 't',
            FileCategory::Empty => 'e',
        }
    }

    /// Empty files are surfaced but never pre-selected for deletion.
    pub fn selected_by_default(&self) -> bool {
        !matches!(self, FileCategory::Empty)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileCategory::Duplicate => "duplicate",
            FileCategory::Log => "log",
            FileCategory::Temp => "temp",
            FileCategory::Empty => "empty",
        }
    }
}

/// One flagged file. A path may appear under more than one category with
/// distinct ids; categories are not mutually exclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRecord {
    pub id: String,
    pub category: FileCategory,
    pub path: PathBuf,
    pub name: String,
    pub dir: PathBuf,
    pub size_mb: f64,
    pub reason: String,
    pub selected: bool,
}

impl FileRecord {
    /// Build a record for the file at `index` within the current scan's
    /// discovery order. The id stays unique per scan because each category
    /// flags any given index at most once.
    pub fn new(
        category: FileCategory,
        index: usize,
        path: &Path,
        size_mb: f64,
        reason: String,
    ) -> Self {
        Self {
            id: format!("{}{}", category.tag(), index),
            category,
            path: path.to_path_buf(),
            name: display_name(path),
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            size_mb,
            reason,
            selected: category.selected_by_default(),
        }
    }
}

/// The single per-process progress snapshot. Overwritten at scan start,
/// flipped to non-running with a terminal summary at scan end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScanStatus {
    pub running: bool,
    pub progress: u64,
    pub total: u64,
    pub current: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteOutcome {
    pub id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteOutcome {
    pub fn succeeded(id: &str) -> Self {
        Self {
            id: id.to_string(),
            success: true,
            error: None,
        }
    }

    pub fn failed(id: &str, error: String) -> Self {
        Self {
            id: id.to_string(),
            success: false,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanReport {
    pub report_version: String,
    pub generated_at: String,
    pub roots: Vec<String>,
    pub records: Vec<FileRecord>,
    pub reclaimable_mb: f64,
}

impl ScanReport {
    pub fn new(roots: &[PathBuf], records: Vec<FileRecord>) -> Self {
        Self {
            report_version: REPORT_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            roots: roots
                .iter()
                .map(|path| path.to_string_lossy().to_string())
                .collect(),
            reclaimable_mb: reclaimable_mb(&records),
            records,
        }
    }
}

/// Sum of flagged sizes across all categories, overlap included.
pub fn reclaimable_mb(records: &[FileRecord]) -> f64 {
    records.iter().map(|record| record.size_mb).sum()
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Apparent size in megabytes. A failed stat reads as zero, which also
/// keeps the file out of duplicate hashing.
pub fn size_mb(path: &Path) -> f64 {
    fs::metadata(path)
        .map(|metadata| metadata.len() as f64 / BYTES_PER_MB)
        .unwrap_or(0.0)
}

/// Whole days since last modification, floored. Zero when the mtime is
/// unavailable or in the future.
pub fn age_days(path: &Path) -> i64 {
    let Ok(metadata) = fs::metadata(path) else {
        return 0;
    };
    let Ok(modified) = metadata.modified() else {
        return 0;
    };
    let modified = DateTime::<Utc>::from(modified);
    (Utc::now() - modified).num_days().max(0)
}
