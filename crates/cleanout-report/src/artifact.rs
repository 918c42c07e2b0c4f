//! Plain-text log artifact layout.

use std::fmt::Write;

use chrono::{DateTime, Local};

use cleanout_core::{LogEntry, RunSummary, format_bytes};

const RULE: &str = "----------------------------------------";

/// File name stem for an artifact written at `at`, without extension.
///
/// Dry runs get their own stem so they never read like real cleanups.
pub fn artifact_stem(dry_run: bool, at: DateTime<Local>) -> String {
    let mode = if dry_run { "_dry_run" } else { "" };
    format!("cleanup{mode}_{}", at.format("%Y%m%d_%H%M%S"))
}

/// Render an artifact: header, notable entries, then the summary block.
pub fn render_artifact(entries: &[LogEntry], summary: &RunSummary, at: DateTime<Local>) -> String {
    let mut out = String::new();
    let stamp = at.format("%Y-%m-%d %H:%M:%S");

    // Writing into a String cannot fail.
    if summary.dry_run {
        let _ = writeln!(out, "DRY RUN - Cleanup Operation Log - {stamp}");
        let _ = writeln!(out, "NO FILES WERE ACTUALLY DELETED");
    } else {
        let _ = writeln!(out, "Cleanup Operation Log - {stamp}");
    }
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);

    for entry in entries.iter().filter(|e| e.is_notable()) {
        let _ = writeln!(
            out,
            "[{}] {} - {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.action,
            entry.path.display()
        );
        if let Some(error) = &entry.error {
            let _ = writeln!(out, "  Error: {error}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "Total Files Scanned: {}", summary.total_scanned);
    let _ = writeln!(
        out,
        "Total Data Processed: {}",
        format_bytes(summary.total_bytes_processed)
    );
    let _ = writeln!(out, "Successful Deletes: {}", summary.successful_deletes);
    let _ = writeln!(out, "Failed Deletes: {}", summary.failed_deletes);

    out
}
