//! cleanout - Remove files that have not been modified in a while.
//!
//! Usage:
//!   cleanout clean [--path P] [--days N]     Delete old files (defaults: temp dir, 7 days)
//!   cleanout clean --dry-run                 Preview what would be deleted
//!   cleanout clean-logs [--days N]           Prune old run logs
//!   cleanout --help                          Show help

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cleanout_core::{
    CleanConfig, CleanError, DEFAULT_THRESHOLD_DAYS, LogAction, LogEntry, RunSummary, ScanResult,
};
use cleanout_report::{DEFAULT_LOG_DIR, Reporter};
use cleanout_scan::{Cleaner, normalize_path};

#[derive(Parser)]
#[command(
    name = "cleanout",
    version,
    about = "A CLI tool to clean temp/cache files older than a specified age",
    long_about = "cleanout scans a directory tree and removes files whose last \
                  modification is older than a given number of days.\n\n\
                  Use --dry-run to preview deletions. Each run writes a log \
                  to the logs/ directory unless --no-log is given."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clean old files from a directory
    Clean {
        /// Directory to scan (defaults to the system temp directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Delete files older than N days
        #[arg(long, default_value_t = DEFAULT_THRESHOLD_DAYS)]
        days: u32,

        /// Preview deletions only
        #[arg(long)]
        dry_run: bool,

        /// Show detailed logs
        #[arg(short, long)]
        verbose: bool,

        /// Do not write a run log
        #[arg(long)]
        no_log: bool,

        /// Directory run logs are written to
        #[arg(long, default_value = DEFAULT_LOG_DIR)]
        log_dir: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete old run logs from the logs directory
    CleanLogs {
        /// Delete log files older than this many days
        #[arg(long, default_value_t = DEFAULT_THRESHOLD_DAYS)]
        days: u32,

        /// Directory holding run logs
        #[arg(long, default_value = DEFAULT_LOG_DIR)]
        log_dir: PathBuf,

        /// Preview deletions only
        #[arg(long)]
        dry_run: bool,

        /// Show detailed logs
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON shape of a `clean` run.
#[derive(Serialize)]
struct CleanReport<'a> {
    result: &'a ScanResult,
    summary: &'a RunSummary,
    log_file: Option<&'a Path>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let verbose = matches!(
        cli.command,
        Command::Clean { verbose: true, .. } | Command::CleanLogs { verbose: true, .. }
    );
    init_tracing(verbose);

    match cli.command {
        Command::Clean {
            path,
            days,
            dry_run,
            verbose,
            no_log,
            log_dir,
            format,
        } => {
            let path = path.unwrap_or_else(std::env::temp_dir);
            let log_dir = (!no_log).then_some(log_dir);
            run_clean(&path, days, dry_run, verbose, log_dir.as_deref(), format)?;
        }
        Command::CleanLogs {
            days,
            log_dir,
            dry_run,
            verbose,
        } => {
            run_clean_logs(&log_dir, days, dry_run, verbose)?;
        }
    }

    Ok(())
}

/// Install the stderr subscriber; `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Run a cleanup and print its summary.
fn run_clean(
    path: &Path,
    days: u32,
    dry_run: bool,
    verbose: bool,
    log_dir: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let root = normalize_path(path);

    let config = CleanConfig::builder()
        .root(root.clone())
        .threshold_days(days)
        .dry_run(dry_run)
        .verbose(verbose)
        .build()?;

    if verbose {
        eprintln!("Scanning: {}", root.display());
        eprintln!("Looking for files older than {days} days...");
    }

    let mut reporter = Reporter::new(dry_run);
    let result = match Cleaner::new().clean(&config, &mut reporter) {
        Ok(result) => result,
        Err(err @ CleanError::RootInaccessible { .. }) => {
            if root.to_string_lossy().contains(' ') {
                eprintln!("Hint: If your path contains spaces, wrap it in double quotes.");
            }
            return Err(err).wrap_err("Cleanup aborted");
        }
        Err(err) => return Err(err).wrap_err("Cleanup failed"),
    };

    let summary = reporter.finalize_summary();

    // A failed log write is a warning, never a failed run.
    let log_file = log_dir.and_then(|dir| match reporter.persist_to(dir) {
        Ok(path) => Some(path),
        Err(err) => {
            tracing::warn!("Could not save run log: {err}");
            None
        }
    });

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(60));
            print!("{}", reporter.render_summary());
            println!("{}", "─".repeat(60));
            println!(" Files checked: {}", result.files_checked);
            if dry_run {
                println!(" Files marked for deletion: {}", result.files_marked_for_deletion);
                println!(" No files were actually deleted (dry-run mode)");
            } else {
                println!(" Files deleted successfully: {}", result.files_actually_deleted);
                if result.failed_deletes() > 0 {
                    println!(" Failed to delete {} files", result.failed_deletes());
                }
            }
            if let Some(path) = &log_file {
                println!(" Log saved to {}", path.display());
            }
            println!();
        }
        OutputFormat::Json => {
            let report = CleanReport {
                result: &result,
                summary: &summary,
                log_file: log_file.as_deref(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Prune run logs older than `days` from `log_dir`.
fn run_clean_logs(log_dir: &Path, days: u32, dry_run: bool, verbose: bool) -> Result<()> {
    println!(
        "Cleaning log files older than {days} days in {}",
        log_dir.display()
    );

    if !log_dir.exists() {
        println!("Logs directory does not exist: {}", log_dir.display());
        return Ok(());
    }

    let config = CleanConfig::builder()
        .root(log_dir)
        .threshold_days(days)
        .dry_run(dry_run)
        .verbose(verbose)
        .build()?;

    let mut reporter = Reporter::new(dry_run);
    let result = Cleaner::new()
        .clean(&config, &mut reporter)
        .context("Log cleanup failed")?;

    for line in reporter.entries().iter().filter_map(deletion_line) {
        println!("{line}");
    }
    println!("Log cleanup complete.");
    if dry_run {
        println!("Log files that would be deleted: {}", result.files_marked_for_deletion);
    } else {
        println!("Total files deleted: {}", result.files_actually_deleted);
    }

    Ok(())
}

/// One line per deletion attempt; `None` for plain scan events.
fn deletion_line(entry: &LogEntry) -> Option<String> {
    let path = entry.path.display();
    match (entry.action, &entry.error) {
        (LogAction::Scan, _) => None,
        (LogAction::WouldDelete, _) => Some(format!("Would delete file: {path}")),
        (LogAction::Delete, None) => Some(format!("Deleted file: {path}")),
        (LogAction::Delete, Some(err)) => Some(format!("Error deleting file {path}: {err}")),
    }
}
