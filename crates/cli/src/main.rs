use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use sysclean_core::{
    collect_doctor_info, default_roots, reclaimable_mb, FileCategory, FileRecord, ScanReport,
};
use sysclean_service::{delete_files, run_scan, ScanRequest};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "sysclean",
    version,
    about = "Find and remove reclaimable files: duplicates, stale logs, temp artifacts, empty files."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan for reclaimable files and write a JSON report.
    Scan(ScanArgs),
    /// Scan, then delete the selected records.
    Clean(CleanArgs),
    /// Show environment, disks, and default scan roots.
    Doctor,
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// Root paths to scan. If omitted, the default user folders are used.
    #[arg(long = "paths", value_name = "PATH", num_args = 1.., action = ArgAction::Append)]
    paths: Vec<PathBuf>,

    /// Output report path.
    #[arg(long, default_value = "sysclean-report.json", value_name = "FILE")]
    output: PathBuf,

    /// Exclude patterns: globs, or plain substrings (repeatable).
    #[arg(long = "exclude", value_name = "PATTERN", num_args = 1.., action = ArgAction::Append)]
    exclude: Vec<String>,

    /// Skip duplicate detection.
    #[arg(long)]
    no_duplicates: bool,

    /// Skip log-file detection.
    #[arg(long)]
    no_logs: bool,

    /// Skip temp/cache detection.
    #[arg(long)]
    no_temp: bool,

    /// Also flag zero-byte files (reported, never pre-selected).
    #[arg(long)]
    empty: bool,
}

#[derive(Debug, Args)]
struct CleanArgs {
    /// Root paths to scan. If omitted, the default user folders are used.
    #[arg(long = "paths", value_name = "PATH", num_args = 1.., action = ArgAction::Append)]
    paths: Vec<PathBuf>,

    /// Exclude patterns: globs, or plain substrings (repeatable).
    #[arg(long = "exclude", value_name = "PATTERN", num_args = 1.., action = ArgAction::Append)]
    exclude: Vec<String>,

    /// Skip duplicate detection.
    #[arg(long)]
    no_duplicates: bool,

    /// Skip log-file detection.
    #[arg(long)]
    no_logs: bool,

    /// Skip temp/cache detection.
    #[arg(long)]
    no_temp: bool,

    /// Also delete zero-byte files.
    #[arg(long)]
    select_empty: bool,

    /// Zero the first 1 MiB of each file before deleting it.
    #[arg(long)]
    secure: bool,

    /// List what would be deleted without touching the filesystem.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => run_scan_command(args),
        Commands::Clean(args) => run_clean_command(args),
        Commands::Doctor => {
            run_doctor_command();
            Ok(())
        }
    }
}

fn run_scan_command(args: ScanArgs) -> Result<()> {
    let roots = resolve_roots(&args.paths);
    let request = ScanRequest {
        paths: roots.clone(),
        duplicates: !args.no_duplicates,
        logs: !args.no_logs,
        temp: !args.no_temp,
        empty: args.empty,
        excludes: args.exclude,
    };

    let records = run_scan(request)?;
    print_summary(&records);

    let report = ScanReport::new(&roots, records);
    let payload = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    fs::write(&args.output, payload)
        .with_context(|| format!("failed to write report to {}", args.output.display()))?;
    println!("Report written to {}", args.output.display());

    Ok(())
}

fn run_clean_command(args: CleanArgs) -> Result<()> {
    let roots = resolve_roots(&args.paths);
    let request = ScanRequest {
        paths: roots,
        duplicates: !args.no_duplicates,
        logs: !args.no_logs,
        temp: !args.no_temp,
        empty: args.select_empty,
        excludes: args.exclude,
    };

    let records = run_scan(request)?;
    print_summary(&records);

    let selected: Vec<&FileRecord> = records
        .iter()
        .filter(|record| {
            record.selected || (args.select_empty && record.category == FileCategory::Empty)
        })
        .collect();
    if selected.is_empty() {
        println!("Nothing selected for deletion.");
        return Ok(());
    }

    if args.dry_run {
        println!("Dry run; {} file(s) would be deleted:", selected.len());
        for record in selected {
            println!(
                "- [{}] {} ({})",
                record.category.label(),
                record.path.display(),
                format_mb(record.size_mb)
            );
        }
        return Ok(());
    }

    let ids: Vec<String> = selected.iter().map(|record| record.id.clone()).collect();
    let outcomes = delete_files(&ids, args.secure)?;

    let mut freed_mb = 0.0;
    let mut failures = 0_usize;
    for outcome in &outcomes {
        let record = selected.iter().find(|record| record.id == outcome.id);
        match (&outcome.error, record) {
            (None, Some(record)) => {
                freed_mb += record.size_mb;
                println!("Deleted: {}", record.path.display());
            }
            (Some(error), _) => {
                failures += 1;
                println!("Failed [{}]: {}", outcome.id, error);
            }
            (None, None) => {}
        }
    }
    println!(
        "Cleanup complete: {} deleted, {} failed, {} freed.",
        outcomes.len() - failures,
        failures,
        format_mb(freed_mb)
    );

    Ok(())
}

fn run_doctor_command() {
    let info = collect_doctor_info();
    println!("OS: {} ({})", info.os, info.arch);
    if let Some(current_dir) = info.current_dir {
        println!("Current directory: {current_dir}");
    }
    println!("Default scan roots: {}", info.default_roots.len());
    for root in info.default_roots {
        println!("- {root}");
    }
    println!("Detected disks: {}", info.disks.len());
    for disk in info.disks {
        println!(
            "- {} [{}] total={} free={} kind={:?} removable={}",
            disk.name,
            disk.mount_point,
            human_bytes(disk.total_space_bytes),
            human_bytes(disk.free_space_bytes),
            disk.kind,
            disk.is_removable
        );
    }
    for note in info.notes {
        println!("Note: {note}");
    }
}

fn resolve_roots(paths: &[PathBuf]) -> Vec<PathBuf> {
    if paths.is_empty() {
        default_roots()
    } else {
        paths.to_vec()
    }
}

fn print_summary(records: &[FileRecord]) {
    let count = |category: FileCategory| {
        records
            .iter()
            .filter(|record| record.category == category)
            .count()
    };
    println!(
        "Found {} item(s): {} duplicate, {} log, {} temp, {} empty.",
        records.len(),
        count(FileCategory::Duplicate),
        count(FileCategory::Log),
        count(FileCategory::Temp),
        count(FileCategory::Empty)
    );
    println!("Reclaimable: {}", format_mb(reclaimable_mb(records)));
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn format_mb(mb: f64) -> String {
    if mb >= 1024.0 {
        format!("{:.2} GB", mb / 1024.0)
    } else if mb < 0.1 {
        format!("{:.0} KB", mb * 1024.0)
    } else {
        format!("{mb:.1} MB")
    }
}

fn human_bytes(value: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if value == 0 {
        return "0 B".to_string();
    }
    let mut size = value as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}
