//! Age-based cleanup over a directory walk.

use std::fs::{self, Metadata};
use std::path::PathBuf;
use std::time::SystemTime;

use cleanout_core::{CleanConfig, CleanError, EntryWarning, LogAction, ScanResult, WarningKind};
use cleanout_report::Reporter;

use crate::path::normalize_path;
use crate::walker::{WalkItem, Walker};

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// What to do with one walked entry.
#[derive(Debug)]
enum Disposition {
    /// Unreadable; record the problem and move on.
    Skip(EntryWarning),
    /// Directories are counted, never compared or removed.
    Directory { size: u64 },
    /// Too recent, or not a regular file.
    Keep { size: u64 },
    /// Regular file last modified before the cutoff.
    Mark { size: u64 },
}

impl Disposition {
    fn classify(item: &WalkItem, cutoff: SystemTime) -> Self {
        let metadata = match &item.outcome {
            Ok(metadata) => metadata,
            Err(warning) => return Self::Skip(warning.clone()),
        };

        let size = metadata.len();
        if metadata.is_dir() {
            return Self::Directory { size };
        }
        if !metadata.is_file() {
            return Self::Keep { size };
        }

        match metadata.modified() {
            Ok(modified) if modified < cutoff => Self::Mark { size },
            Ok(_) => Self::Keep { size },
            Err(err) => Self::Skip(EntryWarning::from_io(
                &item.path,
                &err,
                WarningKind::MetadataError,
            )),
        }
    }
}

/// Walks a tree and deletes (or, in a dry run, marks) files older than the cutoff.
#[derive(Debug, Default)]
pub struct Cleaner;

impl Cleaner {
    /// Create a new cleaner.
    pub fn new() -> Self {
        Self
    }

    /// Run a cleanup, recording every visited entry into `reporter`.
    ///
    /// Fails only if the configuration is inconsistent or the root cannot be
    /// statted; per-entry problems are logged and the walk continues.
    pub fn clean(
        &self,
        config: &CleanConfig,
        reporter: &mut Reporter,
    ) -> Result<ScanResult, CleanError> {
        if reporter.is_dry_run() != config.dry_run {
            return Err(CleanError::InvalidConfig {
                message: "reporter and configuration disagree on dry-run mode".to_string(),
            });
        }

        let root = normalize_path(&config.root);
        fs::metadata(&root).map_err(|e| CleanError::root_inaccessible(&root, e))?;

        let cutoff = config.cutoff();
        tracing::debug!(
            root = %root.display(),
            threshold_days = config.threshold_days,
            dry_run = config.dry_run,
            "Starting cleanup"
        );

        let mut run = CleanRun {
            config,
            reporter,
            result: ScanResult::new(),
        };
        for item in Walker::new(&root).entries() {
            let disposition = Disposition::classify(&item, cutoff);
            run.apply(item, disposition);
        }

        tracing::debug!(
            checked = run.result.files_checked,
            marked = run.result.files_marked_for_deletion,
            deleted = run.result.files_actually_deleted,
            "Cleanup finished"
        );
        Ok(run.result)
    }
}

/// State of one in-progress cleanup.
struct CleanRun<'a> {
    config: &'a CleanConfig,
    reporter: &'a mut Reporter,
    result: ScanResult,
}

impl CleanRun<'_> {
    fn apply(&mut self, item: WalkItem, disposition: Disposition) {
        let verbose = self.config.verbose;
        let path = item.path;

        let (size, is_directory) = match disposition {
            Disposition::Skip(warning) => {
                if verbose {
                    tracing::warn!(kind = ?warning.kind, "Skipping {warning}");
                } else {
                    tracing::debug!(kind = ?warning.kind, "Skipping {warning}");
                }
                self.reporter
                    .record_entry(LogAction::Scan, path, 0, false, false, Some(warning.message));
                return;
            }
            Disposition::Directory { size } => (size, true),
            Disposition::Keep { size } | Disposition::Mark { size } => (size, false),
        };

        self.result.record_checked();
        self.reporter
            .record_entry(LogAction::Scan, &path, size, is_directory, true, None);

        match disposition {
            Disposition::Directory { .. } if verbose => {
                tracing::info!("Skipping directory: {}", path.display());
            }
            Disposition::Keep { .. } if verbose => {
                tracing::info!("Keeping: {}", path.display());
            }
            Disposition::Mark { size } => self.mark(path, size),
            _ => {}
        }
    }

    fn mark(&mut self, path: PathBuf, size: u64) {
        self.result.record_marked();

        if self.config.dry_run {
            tracing::info!("[DRY-RUN] Would delete: {}", path.display());
            self.reporter
                .record_entry(LogAction::WouldDelete, path, size, false, true, None);
            return;
        }

        if self.config.verbose {
            tracing::info!("Deleting: {}", path.display());
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                self.result.record_deleted();
                self.reporter
                    .record_entry(LogAction::Delete, path, size, false, true, None);
            }
            Err(err) => {
                tracing::warn!("Failed to delete {}: {err}", path.display());
                self.reporter.record_entry(
                    LogAction::Delete,
                    path,
                    size,
                    false,
                    false,
                    Some(err.to_string()),
                );
            }
        }
    }
}

/// Age of a file in fractional days, measured back from `now`.
///
/// Returns `None` if the modification time is unavailable. Files modified
/// after `now` report a negative age.
pub fn file_age_days(metadata: &Metadata, now: SystemTime) -> Option<f64> {
    let modified = metadata.modified().ok()?;
    let age = match now.duration_since(modified) {
        Ok(elapsed) => elapsed.as_secs_f64(),
        Err(ahead) => -ahead.duration().as_secs_f64(),
    };
    Some(age / SECONDS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{FileTime, set_file_mtime};
    use std::time::Duration;
    use tempfile::TempDir;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn backdate(path: &std::path::Path, now: SystemTime, age: Duration) {
        set_file_mtime(path, FileTime::from_system_time(now - age)).unwrap();
    }

    fn config(root: &std::path::Path, now: SystemTime, dry_run: bool) -> CleanConfig {
        CleanConfig::builder()
            .root(root)
            .threshold_days(7u32)
            .dry_run(dry_run)
            .reference_time(now)
            .build()
            .unwrap()
    }

    #[test]
    fn test_classify_directory_never_marked() {
        let temp = TempDir::new().unwrap();
        let now = SystemTime::now();
        backdate(temp.path(), now, 30 * DAY);

        let item = Walker::new(temp.path()).entries().next().unwrap();
        let disposition = Disposition::classify(&item, now - 7 * DAY);

        assert!(matches!(disposition, Disposition::Directory { .. }));
    }

    /// Now, truncated to whole seconds so filesystems without sub-second
    /// mtimes store the fixture times exactly.
    fn whole_seconds_now() -> SystemTime {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_secs();
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_classify_cutoff_boundary() {
        let temp = TempDir::new().unwrap();
        let now = whole_seconds_now();
        let exact = temp.path().join("exact.txt");
        let older = temp.path().join("older.txt");
        fs::write(&exact, "x").unwrap();
        fs::write(&older, "x").unwrap();

        let cutoff = now - 7 * DAY;
        set_file_mtime(&exact, FileTime::from_system_time(cutoff)).unwrap();
        set_file_mtime(&older, FileTime::from_system_time(cutoff - Duration::from_secs(1)))
            .unwrap();

        let items: Vec<_> = Walker::new(temp.path()).entries().collect();
        let find = |name: &str| items.iter().find(|i| i.path.ends_with(name)).unwrap();

        assert!(matches!(
            Disposition::classify(find("exact.txt"), cutoff),
            Disposition::Keep { .. }
        ));
        assert!(matches!(
            Disposition::classify(find("older.txt"), cutoff),
            Disposition::Mark { size: 1 }
        ));
    }

    #[test]
    fn test_classify_unreadable_is_skipped() {
        let item = WalkItem {
            path: "/gone".into(),
            depth: 1,
            outcome: Err(EntryWarning::new("/gone", "vanished", WarningKind::Vanished)),
        };

        assert!(matches!(
            Disposition::classify(&item, SystemTime::now()),
            Disposition::Skip(_)
        ));
    }

    #[test]
    fn test_skipped_entry_not_counted() {
        let now = SystemTime::now();
        let cfg = config(std::path::Path::new("/unused"), now, false);
        let mut reporter = Reporter::new(false);
        let mut run = CleanRun {
            config: &cfg,
            reporter: &mut reporter,
            result: ScanResult::new(),
        };

        let item = WalkItem {
            path: "/gone".into(),
            depth: 1,
            outcome: Err(EntryWarning::new("/gone", "vanished", WarningKind::Vanished)),
        };
        let disposition = Disposition::classify(&item, now);
        run.apply(item, disposition);

        assert_eq!(run.result, ScanResult::new());
        let entry = &reporter.entries()[0];
        assert_eq!(entry.action, LogAction::Scan);
        assert!(!entry.success);
        assert_eq!(entry.error.as_deref(), Some("vanished"));
    }

    #[test]
    fn test_failed_delete_is_tallied() {
        let temp = TempDir::new().unwrap();
        let cfg = config(temp.path(), SystemTime::now(), false);
        let mut reporter = Reporter::new(false);
        let mut run = CleanRun {
            config: &cfg,
            reporter: &mut reporter,
            result: ScanResult::new(),
        };

        // Removed between classification and deletion.
        run.mark(temp.path().join("already-gone.tmp"), 10);

        assert_eq!(run.result.files_marked_for_deletion, 1);
        assert_eq!(run.result.files_actually_deleted, 0);
        assert_eq!(run.result.failed_deletes(), 1);
        assert_eq!(reporter.summary().failed_deletes, 1);
        assert_eq!(reporter.summary().successful_deletes, 0);

        let entry = &reporter.entries()[0];
        assert_eq!(entry.action, LogAction::Delete);
        assert_eq!(entry.size, 10);
        assert!(!entry.success);
        assert!(entry.error.is_some());
    }

    #[test]
    fn test_failed_delete_does_not_stop_walk() {
        let temp = TempDir::new().unwrap();
        let now = SystemTime::now();
        let old_dir = temp.path().join("old-dir");
        fs::create_dir(&old_dir).unwrap();
        fs::write(temp.path().join("old.tmp"), "x").unwrap();
        backdate(&temp.path().join("old.tmp"), now, 30 * DAY);

        let cfg = config(temp.path(), now, false);
        let mut reporter = Reporter::new(false);
        let mut run = CleanRun {
            config: &cfg,
            reporter: &mut reporter,
            result: ScanResult::new(),
        };

        // A directory cannot be removed with remove_file.
        run.mark(old_dir.clone(), 0);
        for item in Walker::new(temp.path()).entries() {
            let disposition = Disposition::classify(&item, cfg.cutoff());
            run.apply(item, disposition);
        }

        assert!(old_dir.exists());
        assert!(!temp.path().join("old.tmp").exists());
        assert_eq!(run.result.files_marked_for_deletion, 2);
        assert_eq!(run.result.files_actually_deleted, 1);
        assert_eq!(reporter.summary().failed_deletes, 1);
        assert_eq!(reporter.summary().successful_deletes, 1);
    }

    #[test]
    fn test_mismatched_reporter_rejected() {
        let temp = TempDir::new().unwrap();
        let cfg = config(temp.path(), SystemTime::now(), true);
        let mut reporter = Reporter::new(false);

        let err = Cleaner::new().clean(&cfg, &mut reporter).unwrap_err();
        assert!(matches!(err, CleanError::InvalidConfig { .. }));
    }

    #[test]
    fn test_file_age_days() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.txt");
        fs::write(&path, "x").unwrap();
        let now = SystemTime::now();
        backdate(&path, now, 10 * DAY);

        let age = file_age_days(&fs::metadata(&path).unwrap(), now).unwrap();
        assert!((age - 10.0).abs() < 0.001);
    }
}
