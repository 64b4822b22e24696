use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::scan::CancelToken;

/// Roots are depth 0; nothing deeper than this many levels is visited.
pub const MAX_DEPTH: usize = 6;

/// Directory base names (lowercased) that are never descended into:
/// OS/system trees, the recycle bin, boot and recovery areas.
const SKIP_DIRS: &[&str] = &[
    "windows",
    "system32",
    "syswow64",
    "program files",
    "program files (x86)",
    "$recycle.bin",
    "boot",
    "recovery",
];

/// Enumerate every regular file reachable from `roots`, in traversal order.
/// Roots that do not exist are omitted. Directories that fail to enumerate
/// contribute no files; the walk continues elsewhere. Symlinks are not
/// followed, and no cycle detection exists beyond the depth bound and the
/// skip set.
pub fn collect_files(
    roots: &[PathBuf],
    excludes: &ExcludeMatcher,
    cancel: &CancelToken,
) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for root in roots {
        if !root.is_dir() {
            debug!("skipping missing scan root: {}", root.display());
            continue;
        }

        let walker = WalkDir::new(root)
            .follow_links(false)
            .max_depth(MAX_DEPTH)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || (!is_skipped_dir(entry) && !excludes.is_excluded(entry.path()))
            });

        for item in walker {
            if cancel.is_cancelled() {
                return files;
            }
            let Ok(entry) = item else {
                // Unreadable entries degrade to "contributes nothing".
                continue;
            };
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }

    files
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy().to_lowercase();
    SKIP_DIRS.contains(&name.as_str())
}

/// Caller-supplied exclude patterns: globs where the pattern contains glob
/// metacharacters, lowercased substring tests otherwise.
#[derive(Debug, Default)]
pub struct ExcludeMatcher {
    globset: Option<GlobSet>,
    substrings: Vec<String>,
}

impl ExcludeMatcher {
    pub fn new(patterns: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut substrings = Vec::new();
        for pattern in patterns {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                continue;
            }
            let is_glob = pattern.chars().any(|ch| matches!(ch, '*' | '?' | '[' | ']' | '{' | '}'));
            match Glob::new(pattern) {
                Ok(glob) if is_glob => {
                    builder.add(glob);
                }
                // Plain text and unparseable patterns fall back to substring.
                _ => substrings.push(pattern.to_lowercase()),
            }
        }

        Self {
            globset: builder.build().ok(),
            substrings,
        }
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        if let Some(globset) = &self.globset {
            if globset.is_match(path) {
                return true;
            }
        }
        if self.substrings.is_empty() {
            return false;
        }
        let lowered = path.to_string_lossy().to_lowercase();
        self.substrings.iter().any(|pattern| lowered.contains(pattern))
    }
}
