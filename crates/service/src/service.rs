use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};
use std::thread;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use sysclean_core::{
    default_roots, delete_files as engine_delete, run_scan as engine_scan, DeleteOutcome,
    FileRecord, ScanOptions, ScanStatus, StatusHandle,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A second scan (or a delete during a scan) would mutate the shared
    /// status and result store out from under the running scan.
    #[error("a scan is already running")]
    ScanInProgress,
    #[error("engine state lock poisoned")]
    StatePoisoned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Roots to scan; the collaborator-default path set when empty.
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    #[serde(default = "default_enabled")]
    pub duplicates: bool,
    #[serde(default = "default_enabled")]
    pub logs: bool,
    #[serde(default = "default_enabled")]
    pub temp: bool,
    #[serde(default)]
    pub empty: bool,
    #[serde(default)]
    pub excludes: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            duplicates: true,
            logs: true,
            temp: true,
            empty: false,
            excludes: Vec::new(),
        }
    }
}

struct EngineState {
    status: StatusHandle,
    store: Mutex<Vec<FileRecord>>,
    scanning: AtomicBool,
    cancel_flag: Mutex<Arc<AtomicBool>>,
}

static ENGINE: Lazy<EngineState> = Lazy::new(|| EngineState {
    status: StatusHandle::default(),
    store: Mutex::new(Vec::new()),
    scanning: AtomicBool::new(false),
    cancel_flag: Mutex::new(Arc::new(AtomicBool::new(false))),
});

/// Releases the scan latch when the scan ends, and forces the status out
/// of its running state if the worker unwound mid-scan.
struct ScanGuard;

impl Drop for ScanGuard {
    fn drop(&mut self) {
        if ENGINE.status.snapshot().running {
            ENGINE.status.finish("Scan aborted".to_string());
        }
        ENGINE.scanning.store(false, Ordering::SeqCst);
    }
}

fn acquire_scan_slot() -> Result<ScanGuard, EngineError> {
    ENGINE
        .scanning
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .map_err(|_| EngineError::ScanInProgress)?;
    Ok(ScanGuard)
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, EngineError> {
    mutex.lock().map_err(|_| EngineError::StatePoisoned)
}

fn execute_scan(request: ScanRequest) -> Result<Vec<FileRecord>, EngineError> {
    let cancel = Arc::new(AtomicBool::new(false));
    *lock(&ENGINE.cancel_flag)? = Arc::clone(&cancel);
    lock(&ENGINE.store)?.clear();

    let roots = if request.paths.is_empty() {
        default_roots()
    } else {
        request.paths
    };
    let options = ScanOptions {
        roots,
        duplicates: request.duplicates,
        logs: request.logs,
        temp: request.temp,
        empty: request.empty,
        excludes: request.excludes,
        cancel_flag: Some(cancel),
    };

    let records = engine_scan(&options, &ENGINE.status);
    *lock(&ENGINE.store)? = records.clone();
    Ok(records)
}

/// Run a scan to completion on the calling thread and return the flagged
/// records. Rejects if a scan is already running.
pub fn run_scan(request: ScanRequest) -> Result<Vec<FileRecord>, EngineError> {
    let guard = acquire_scan_slot()?;
    let outcome = execute_scan(request);
    drop(guard);
    outcome
}

/// Run a scan on a background thread; callers poll `status()` and fetch
/// `results()` once it stops running. Returns a scan id for log
/// correlation.
pub fn start_scan(request: ScanRequest) -> Result<String, EngineError> {
    let guard = acquire_scan_slot()?;
    let scan_id = Uuid::new_v4().to_string();
    let worker_id = scan_id.clone();

    thread::spawn(move || {
        let _guard = guard;
        info!(scan_id = %worker_id, "background scan started");
        match execute_scan(request) {
            Ok(records) => {
                info!(scan_id = %worker_id, records = records.len(), "background scan finished");
            }
            Err(err) => error!(scan_id = %worker_id, "background scan failed: {err}"),
        }
    });

    Ok(scan_id)
}

/// Always-available snapshot of the per-process scan status.
pub fn status() -> ScanStatus {
    ENGINE.status.snapshot()
}

/// Records flagged by the most recent scan.
pub fn results() -> Result<Vec<FileRecord>, EngineError> {
    Ok(lock(&ENGINE.store)?.clone())
}

/// Signal the running scan to stop at its next check point. Returns false
/// when no scan is running.
pub fn cancel_scan() -> bool {
    if !ENGINE.scanning.load(Ordering::SeqCst) {
        return false;
    }
    match ENGINE.cancel_flag.lock() {
        Ok(flag) => {
            flag.store(true, Ordering::Relaxed);
            true
        }
        Err(_) => false,
    }
}

/// Delete the identified records from disk and from the result store.
/// Rejected while a scan is mutating the store.
pub fn delete_files(ids: &[String], secure: bool) -> Result<Vec<DeleteOutcome>, EngineError> {
    let mut store = lock(&ENGINE.store)?;
    // Checked under the store lock: a scan latches before it touches the
    // store, so either it is visible here and the delete is rejected, or
    // it blocks on this lock until the whole batch has finished.
    if ENGINE.scanning.load(Ordering::SeqCst) {
        return Err(EngineError::ScanInProgress);
    }
    Ok(engine_delete(&mut store, ids, secure))
}
