pub mod classify;
pub mod dedupe;
pub mod delete;
pub mod doctor;
pub mod model;
pub mod roots;
pub mod scan;
pub mod walk;

pub use delete::{delete_files, SECURE_WIPE_BYTES};
pub use doctor::{collect_doctor_info, DiskKind, DiskSnapshot, DoctorInfo};
pub use model::{
    reclaimable_mb, DeleteOutcome, FileCategory, FileRecord, ScanReport, ScanStatus,
    REPORT_VERSION,
};
pub use roots::default_roots;
pub use scan::{run_scan, CancelToken, ScanOptions, StatusHandle};
pub use walk::{ExcludeMatcher, MAX_DEPTH};
