use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

/// Resolve the default scan roots from the environment: the common user
/// content folders, the OS temp directory, and well-known cache
/// locations. Candidates that do not exist are dropped; duplicates are
/// collapsed case-insensitively.
pub fn default_roots() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(home) = home_dir() {
        for folder in ["Downloads", "Documents", "Desktop", "Pictures"] {
            candidates.push(home.join(folder));
        }
        candidates.push(home.join(".cache"));
    }
    candidates.push(env::temp_dir());
    if let Some(appdata) = env::var_os("APPDATA") {
        candidates.push(PathBuf::from(appdata).join("npm-cache"));
    }

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|path| path.is_dir())
        .filter(|path| seen.insert(path.to_string_lossy().to_lowercase()))
        .collect()
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("USERPROFILE")
        .or_else(|| env::var_os("HOME"))
        .map(PathBuf::from)
}
