use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use sysclean_service::{cancel_scan, delete_files, start_scan, status, EngineError, ScanRequest};

/// While a background scan holds the engine, a second scan and a delete
/// batch are both rejected; cancellation then winds the scan down to a
/// non-running status.
#[test]
fn concurrent_scan_and_delete_are_rejected_until_cancelled() {
    let temp = TempDir::new().expect("tempdir");
    // Enough identical files that the duplicate pass hashes for a while.
    let payload = vec![b'Z'; 4096];
    for index in 0..2000 {
        fs::write(temp.path().join(format!("file{index:04}.dat")), &payload)
            .expect("write fixture file");
    }

    let request = ScanRequest {
        paths: vec![temp.path().to_path_buf()],
        ..ScanRequest::default()
    };

    // The scan latch is taken before the worker thread spawns, so a
    // competing scan and a delete batch must both bounce immediately.
    let scan_id = start_scan(request.clone()).expect("first scan starts");
    assert!(!scan_id.is_empty());
    assert_eq!(start_scan(request), Err(EngineError::ScanInProgress));
    assert_eq!(
        delete_files(&["zz".to_string()], false),
        Err(EngineError::ScanInProgress)
    );

    assert!(cancel_scan(), "scan should still be running when cancelled");

    let started = Instant::now();
    while status().running {
        assert!(
            started.elapsed() < Duration::from_secs(30),
            "scan never left its running state after cancellation"
        );
        thread::sleep(Duration::from_millis(25));
    }

    // With the engine idle again a delete batch goes through; unknown ids
    // are skipped without an outcome.
    let outcomes = delete_files(&["zz".to_string()], false).expect("delete after scan");
    assert!(outcomes.is_empty());
}
