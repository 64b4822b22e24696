pub mod service;

pub use service::{
    cancel_scan, delete_files, results, run_scan, start_scan, status, EngineError, ScanRequest,
};
