//! Per-run event log and summary aggregation.

use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;

use cleanout_core::{CleanError, LogAction, LogEntry, RunSummary, format_bytes};

use crate::artifact::{artifact_stem, render_artifact};

/// Directory, relative to the working directory, that artifacts are written to.
pub const DEFAULT_LOG_DIR: &str = "logs";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accumulates the events of a single cleanup run.
///
/// One reporter belongs to exactly one run; create a fresh one per
/// invocation.
#[derive(Debug)]
pub struct Reporter {
    entries: Vec<LogEntry>,
    summary: RunSummary,
}

impl Reporter {
    /// Start a new run log.
    pub fn new(dry_run: bool) -> Self {
        Self {
            entries: Vec::new(),
            summary: RunSummary::new(dry_run),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.summary.dry_run
    }

    /// Events recorded so far, in order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Running totals.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Record an event, looking up the path's current size and type.
    ///
    /// The lookup is best-effort: a path that no longer exists is recorded
    /// with size 0 as a non-directory.
    pub fn record_event(
        &mut self,
        action: LogAction,
        path: impl AsRef<Path>,
        success: bool,
        error: Option<String>,
    ) {
        let path = path.as_ref();
        let (size, is_directory) = fs::metadata(path)
            .map(|m| (m.len(), m.is_dir()))
            .unwrap_or((0, false));
        self.record_entry(action, path, size, is_directory, success, error);
    }

    /// Record an event for which the caller already knows size and type.
    pub fn record_entry(
        &mut self,
        action: LogAction,
        path: impl Into<PathBuf>,
        size: u64,
        is_directory: bool,
        success: bool,
        error: Option<String>,
    ) {
        let action = match action {
            LogAction::Delete if self.summary.dry_run => LogAction::WouldDelete,
            other => other,
        };

        let entry = LogEntry {
            timestamp: Local::now(),
            action,
            path: path.into(),
            size,
            is_directory,
            success,
            error,
        };

        self.summary.apply(&entry);
        self.entries.push(entry);
    }

    /// Stamp the end time and return a snapshot of the totals.
    ///
    /// Calling it again restamps the end time.
    pub fn finalize_summary(&mut self) -> RunSummary {
        self.summary.finish();
        self.summary.clone()
    }

    /// Render a human-readable report of the run.
    pub fn render_summary(&self) -> String {
        let summary = &self.summary;
        let end = summary.end_time.unwrap_or_else(Local::now);
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(out, "Operation Summary:");
        let _ = writeln!(out, "Start Time: {}", summary.start_time.format(TIME_FORMAT));
        let _ = writeln!(out, "End Time: {}", end.format(TIME_FORMAT));
        let _ = writeln!(out, "Duration: {:?}", round_to_millis(summary.duration()));
        let _ = writeln!(out, "Total Files Scanned: {}", summary.total_scanned);
        let _ = writeln!(
            out,
            "Total Data Processed: {}",
            format_bytes(summary.total_bytes_processed)
        );

        if summary.dry_run {
            let _ = writeln!(out, "Files that would be deleted: {}", summary.successful_deletes);
        } else {
            let _ = writeln!(out, "Successfully Deleted: {}", summary.successful_deletes);
            let _ = writeln!(out, "Failed Deletions: {}", summary.failed_deletes);
        }

        out
    }

    /// Write the run log to a new artifact under [`DEFAULT_LOG_DIR`].
    pub fn persist(&self) -> Result<PathBuf, CleanError> {
        self.persist_to(DEFAULT_LOG_DIR)
    }

    /// Write the run log to a new artifact in `dir`, creating it if needed.
    ///
    /// Never overwrites an existing artifact; returns the path written.
    pub fn persist_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, CleanError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| CleanError::persistence(dir, e))?;

        let now = Local::now();
        let (path, mut file) = create_unique(dir, &artifact_stem(self.summary.dry_run, now))?;

        let text = render_artifact(&self.entries, &self.summary, now);
        file.write_all(text.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| CleanError::persistence(&path, e))?;

        tracing::debug!(path = %path.display(), entries = self.entries.len(), "Wrote run log");
        Ok(path)
    }
}

/// Open `<stem>.log` in `dir`, or `<stem>_N.log` if that name is taken.
fn create_unique(dir: &Path, stem: &str) -> Result<(PathBuf, File), CleanError> {
    let mut attempt: u32 = 0;
    loop {
        let name = match attempt {
            0 => format!("{stem}.log"),
            n => format!("{stem}_{n}.log"),
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(CleanError::persistence(path, e)),
        }
    }
}

fn round_to_millis(duration: Duration) -> Duration {
    Duration::from_millis(duration.as_millis().try_into().unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_event_looks_up_size() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, vec![0u8; 500]).unwrap();

        let mut reporter = Reporter::new(false);
        reporter.record_event(LogAction::Scan, temp.path(), true, None);
        reporter.record_event(LogAction::Delete, &file, true, None);

        let entries = reporter.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_directory);
        assert_eq!(entries[1].size, 500);
        assert!(!entries[1].is_directory);
        assert_eq!(reporter.summary().total_bytes_processed, 500);
    }

    #[test]
    fn test_record_event_missing_path() {
        let mut reporter = Reporter::new(false);
        reporter.record_event(
            LogAction::Delete,
            "/definitely/not/here.txt",
            false,
            Some("No such file or directory".to_string()),
        );

        let entry = &reporter.entries()[0];
        assert_eq!(entry.size, 0);
        assert!(!entry.is_directory);
        assert_eq!(reporter.summary().failed_deletes, 1);
    }

    #[test]
    fn test_dry_run_relabels_delete() {
        let mut reporter = Reporter::new(true);
        reporter.record_entry(LogAction::Delete, "/tmp/old", 10, false, true, None);
        reporter.record_entry(LogAction::Scan, "/tmp/new", 10, false, true, None);

        assert_eq!(reporter.entries()[0].action, LogAction::WouldDelete);
        assert_eq!(reporter.entries()[1].action, LogAction::Scan);
        assert_eq!(reporter.summary().successful_deletes, 1);
        assert_eq!(reporter.summary().total_scanned, 1);
    }

    #[test]
    fn test_finalize_is_repeatable() {
        let mut reporter = Reporter::new(false);
        reporter.record_entry(LogAction::Scan, "/tmp", 0, true, true, None);

        let first = reporter.finalize_summary();
        let second = reporter.finalize_summary();

        assert!(first.end_time.is_some());
        assert!(second.end_time >= first.end_time);
        assert_eq!(first.total_scanned, second.total_scanned);
    }

    #[test]
    fn test_render_summary_live() {
        let mut reporter = Reporter::new(false);
        reporter.record_entry(LogAction::Scan, "/tmp/a", 2048, false, true, None);
        reporter.record_entry(LogAction::Delete, "/tmp/a", 2048, false, true, None);
        reporter.record_entry(LogAction::Delete, "/tmp/b", 1, false, false, Some("denied".into()));
        reporter.finalize_summary();

        let text = reporter.render_summary();
        assert!(text.starts_with("Operation Summary:\n"));
        assert!(text.contains("Duration: "));
        assert!(text.contains("Total Files Scanned: 1\n"));
        assert!(text.contains("Total Data Processed: 2.0 KB\n"));
        assert!(text.contains("Successfully Deleted: 1\n"));
        assert!(text.contains("Failed Deletions: 1\n"));
        assert!(!text.contains("would be deleted"));
    }

    #[test]
    fn test_render_summary_dry_run() {
        let mut reporter = Reporter::new(true);
        reporter.record_entry(LogAction::Delete, "/tmp/a", 10, false, true, None);
        reporter.record_entry(LogAction::Delete, "/tmp/b", 0, false, false, Some("gone".into()));
        reporter.finalize_summary();

        let text = reporter.render_summary();
        assert!(text.contains("Files that would be deleted: 1\n"));
        assert!(!text.contains("Successfully Deleted"));
        assert!(!text.contains("Failed"));
        assert!(!text.contains("could not"));
    }

    #[test]
    fn test_round_to_millis() {
        assert_eq!(
            round_to_millis(Duration::from_micros(12_345)),
            Duration::from_millis(12)
        );
    }
}
