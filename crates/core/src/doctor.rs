use std::env;

use serde::{Deserialize, Serialize};
use sysinfo::{DiskKind as SysDiskKind, Disks};

use crate::roots::default_roots;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorInfo {
    pub os: String,
    pub arch: String,
    pub current_dir: Option<String>,
    pub default_roots: Vec<String>,
    pub disks: Vec<DiskSnapshot>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskSnapshot {
    pub name: String,
    pub mount_point: String,
    pub total_space_bytes: u64,
    pub free_space_bytes: u64,
    pub kind: DiskKind,
    pub file_system: Option<String>,
    pub is_removable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiskKind {
    Ssd,
    Hdd,
    Unknown,
}

pub fn collect_doctor_info() -> DoctorInfo {
    let current_dir = env::current_dir()
        .ok()
        .map(|path| path.to_string_lossy().to_string());

    let default_roots = default_roots()
        .iter()
        .map(|root| root.to_string_lossy().to_string())
        .collect::<Vec<_>>();

    let disks = enumerate_disks();
    let mut notes = vec![
        "Deletion only touches files flagged by the most recent scan.".to_string(),
        "Secure wipe overwrites at most the first 1 MiB before unlinking.".to_string(),
    ];
    if default_roots.is_empty() {
        notes.push("No default scan roots resolved; pass explicit --paths.".to_string());
    }
    if disks.is_empty() {
        notes.push("No disks detected by sysinfo.".to_string());
    }

    DoctorInfo {
        os: env::consts::OS.to_string(),
        arch: env::consts::ARCH.to_string(),
        current_dir,
        default_roots,
        disks,
        notes,
    }
}

fn enumerate_disks() -> Vec<DiskSnapshot> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .map(|disk| DiskSnapshot {
            name: disk.name().to_string_lossy().to_string(),
            mount_point: disk.mount_point().to_string_lossy().to_string(),
            total_space_bytes: disk.total_space(),
            free_space_bytes: disk.available_space(),
            kind: match disk.kind() {
                SysDiskKind::HDD => DiskKind::Hdd,
                SysDiskKind::SSD => DiskKind::Ssd,
                _ => DiskKind::Unknown,
            },
            file_system: Some(disk.file_system().to_string_lossy().to_string()),
            is_removable: disk.is_removable(),
        })
        .collect()
}
