use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use tracing::info;

use crate::classify::{collect_empty_records, collect_log_records, collect_temp_records};
use crate::dedupe::find_duplicates;
use crate::model::{FileRecord, ScanStatus};
use crate::walk::{collect_files, ExcludeMatcher};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub roots: Vec<PathBuf>,
    pub duplicates: bool,
    pub logs: bool,
    pub temp: bool,
    pub empty: bool,
    pub excludes: Vec<String>,
    pub cancel_flag: Option<Arc<AtomicBool>>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            duplicates: true,
            logs: true,
            temp: true,
            empty: false,
            excludes: Vec::new(),
            cancel_flag: None,
        }
    }
}

/// Cooperative cancellation signal, checked at walk and pass boundaries.
/// The default token never cancels.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Option<Arc<AtomicBool>>);

impl CancelToken {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self(Some(flag))
    }

    pub fn is_cancelled(&self) -> bool {
        self.0
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Shared handle to the scan-status snapshot. Writers hold the lock only
/// long enough to mutate one field, so readers never block for more than
/// an instant.
#[derive(Debug, Clone, Default)]
pub struct StatusHandle {
    inner: Arc<Mutex<ScanStatus>>,
}

impl StatusHandle {
    pub fn snapshot(&self) -> ScanStatus {
        self.inner
            .lock()
            .map(|status| status.clone())
            .unwrap_or_default()
    }

    fn with(&self, mutate: impl FnOnce(&mut ScanStatus)) {
        if let Ok(mut status) = self.inner.lock() {
            mutate(&mut status);
        }
    }

    /// Replace the snapshot with a fresh running state.
    pub fn begin(&self, message: &str) {
        let current = message.to_string();
        self.with(|status| {
            *status = ScanStatus {
                running: true,
                progress: 0,
                total: 0,
                current,
            };
        });
    }

    pub fn set_total(&self, total: u64) {
        self.with(|status| status.total = total);
    }

    pub fn set_progress(&self, progress: u64) {
        self.with(|status| status.progress = progress);
    }

    pub fn set_message(&self, message: &str) {
        let current = message.to_string();
        self.with(|status| status.current = current);
    }

    pub fn update(&self, progress: u64, message: String) {
        self.with(|status| {
            status.progress = progress;
            status.current = message;
        });
    }

    /// Flip to non-running with a terminal message; progress tops out at
    /// the walked file total.
    pub fn finish(&self, message: String) {
        self.with(|status| {
            status.running = false;
            status.progress = status.total;
            status.current = message;
        });
    }
}

/// Walk the roots once, then run each enabled classifier over the full
/// file list in fixed order (duplicates, logs, temp, empty). Progress
/// restarts from zero for every pass; `progress / total` is meaningful
/// only within the pass currently named by the status message.
pub fn run_scan(options: &ScanOptions, status: &StatusHandle) -> Vec<FileRecord> {
    let cancel = options
        .cancel_flag
        .clone()
        .map(CancelToken::new)
        .unwrap_or_default();
    let excludes = ExcludeMatcher::new(&options.excludes);

    status.begin("Collecting files...");
    let files = collect_files(&options.roots, &excludes, &cancel);
    status.set_total(files.len() as u64);
    info!(
        "walked {} root(s), {} file(s)",
        options.roots.len(),
        files.len()
    );

    let mut records = Vec::new();
    if options.duplicates && !cancel.is_cancelled() {
        records.extend(find_duplicates(&files, status, &cancel));
    }
    if options.logs && !cancel.is_cancelled() {
        records.extend(collect_log_records(&files, status, &cancel));
    }
    if options.temp && !cancel.is_cancelled() {
        records.extend(collect_temp_records(&files, status, &cancel));
    }
    if options.empty && !cancel.is_cancelled() {
        records.extend(collect_empty_records(&files, status, &cancel));
    }

    let message = if cancel.is_cancelled() {
        format!("Scan canceled: {} items found", records.len())
    } else {
        format!("Scan complete: {} items found", records.len())
    };
    info!("{message}");
    status.finish(message);
    records
}
