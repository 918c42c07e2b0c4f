//! Operation log and run reporting for cleanout.
//!
//! A [`Reporter`] is created per run and handed to the cleanup engine, which
//! records one event per visited entry and per deletion attempt. At the end
//! of the run the reporter renders a human-readable summary and can persist
//! the notable events to a timestamped log file.
//!
//! ```rust,no_run
//! use cleanout_report::{Reporter, LogAction};
//!
//! let mut reporter = Reporter::new(true);
//! reporter.record_event(LogAction::Delete, "/tmp/old.txt", true, None);
//! reporter.finalize_summary();
//!
//! println!("{}", reporter.render_summary());
//! match reporter.persist() {
//!     Ok(path) => println!("Log saved to {}", path.display()),
//!     Err(err) => eprintln!("Warning: {err}"),
//! }
//! ```

mod artifact;
mod reporter;

pub use artifact::{artifact_stem, render_artifact};
pub use reporter::{DEFAULT_LOG_DIR, Reporter};

// Re-export core types for convenience
pub use cleanout_core::{CleanError, LogAction, LogEntry, RunSummary, format_bytes};
