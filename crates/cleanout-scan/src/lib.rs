//! Directory walk and age-based deletion engine for cleanout.
//!
//! # Overview
//!
//! `cleanout-scan` walks a directory tree, compares each regular file's
//! modification time against a cutoff and removes the files that fall
//! before it. Key properties:
//!
//! - **Sequential** traversal via jwalk in serial mode
//! - **Continue-on-error**: unreadable entries and failed deletions are
//!   logged and skipped, never fatal
//! - **Dry-run** mode that marks files without touching the filesystem
//!
//! # Example
//!
//! ```rust,no_run
//! use cleanout_scan::{CleanConfig, Cleaner, Reporter};
//!
//! let config = CleanConfig::builder()
//!     .root("/tmp")
//!     .threshold_days(14u32)
//!     .dry_run(true)
//!     .build()
//!     .unwrap();
//!
//! let mut reporter = Reporter::new(config.dry_run);
//! let result = Cleaner::new().clean(&config, &mut reporter).unwrap();
//!
//! println!("Checked {} entries", result.files_checked);
//! println!("Would delete {} files", result.files_marked_for_deletion);
//! ```

mod cleaner;
mod path;
mod walker;

pub use cleaner::{Cleaner, file_age_days};
pub use path::normalize_path;
pub use walker::{WalkItem, Walker};

// Re-export core types for convenience
pub use cleanout_core::{
    CleanConfig, CleanError, EntryWarning, LogAction, ScanResult, WarningKind,
};
pub use cleanout_report::Reporter;
