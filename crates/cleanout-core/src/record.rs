//! Per-run counters and log records.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Counters produced by a single cleanup walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Entries successfully inspected, directories included.
    pub files_checked: u64,
    /// Regular files older than the cutoff.
    pub files_marked_for_deletion: u64,
    /// Marked files that were actually removed.
    pub files_actually_deleted: u64,
}

impl ScanResult {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_checked(&mut self) {
        self.files_checked += 1;
    }

    pub fn record_marked(&mut self) {
        self.files_marked_for_deletion += 1;
    }

    pub fn record_deleted(&mut self) {
        self.files_actually_deleted += 1;
    }

    /// Marked files that were not removed.
    ///
    /// In a dry run this equals the marked count, since nothing is removed.
    pub fn failed_deletes(&self) -> u64 {
        self.files_marked_for_deletion
            .saturating_sub(self.files_actually_deleted)
    }

    /// Check `deleted <= marked <= checked`.
    pub fn is_consistent(&self) -> bool {
        self.files_actually_deleted <= self.files_marked_for_deletion
            && self.files_marked_for_deletion <= self.files_checked
    }
}

/// What happened to an entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    /// The entry was visited.
    Scan,
    /// The entry was removed (or removal was attempted).
    Delete,
    /// The entry would have been removed outside a dry run.
    WouldDelete,
}

impl LogAction {
    /// Whether this action counts toward the delete tallies.
    pub fn is_deletion(self) -> bool {
        matches!(self, Self::Delete | Self::WouldDelete)
    }
}

/// One recorded event. Immutable once appended to a log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub action: LogAction,
    pub path: PathBuf,
    /// Size in bytes at the time of recording (0 if unknown).
    pub size: u64,
    pub is_directory: bool,
    pub success: bool,
    pub error: Option<String>,
}

impl LogEntry {
    /// Whether the entry belongs in a persisted artifact.
    ///
    /// Plain file visits are dropped; deletions, directories and anything
    /// carrying an error are kept.
    pub fn is_notable(&self) -> bool {
        self.action.is_deletion() || self.is_directory || self.error.is_some()
    }
}

/// Aggregate totals for a run, derived from its log entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub start_time: DateTime<Local>,
    /// Set when the run is finalized.
    pub end_time: Option<DateTime<Local>>,
    /// Entries successfully visited.
    pub total_scanned: u64,
    /// Bytes covered by successful (or simulated) deletions.
    pub total_bytes_processed: u64,
    /// Successful deletions; in a dry run, files that would be deleted.
    pub successful_deletes: u64,
    pub failed_deletes: u64,
    pub dry_run: bool,
}

impl RunSummary {
    /// Start a summary at the current time.
    pub fn new(dry_run: bool) -> Self {
        Self {
            start_time: Local::now(),
            end_time: None,
            total_scanned: 0,
            total_bytes_processed: 0,
            successful_deletes: 0,
            failed_deletes: 0,
            dry_run,
        }
    }

    /// Fold one log entry into the totals.
    pub fn apply(&mut self, entry: &LogEntry) {
        match entry.action {
            LogAction::Scan => {
                if entry.success {
                    self.total_scanned += 1;
                }
            }
            LogAction::Delete | LogAction::WouldDelete => {
                if entry.success {
                    self.successful_deletes += 1;
                    self.total_bytes_processed += entry.size;
                } else {
                    self.failed_deletes += 1;
                }
            }
        }
    }

    /// Stamp the end time.
    pub fn finish(&mut self) {
        self.end_time = Some(Local::now());
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// Elapsed time between start and end (or now, if still running).
    pub fn duration(&self) -> Duration {
        let end = self.end_time.unwrap_or_else(Local::now);
        (end - self.start_time).to_std().unwrap_or_default()
    }
}
