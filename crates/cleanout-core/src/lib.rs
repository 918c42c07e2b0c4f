//! Core types for cleanout.
//!
//! This crate provides the data structures shared by the cleanup engine,
//! the reporter and the command-line shell: run configuration, per-run
//! counters, log records and the error types.

mod config;
mod error;
mod format;
mod record;

pub use config::{CleanConfig, CleanConfigBuilder, CleanConfigBuilderError, DEFAULT_THRESHOLD_DAYS};
pub use error::{CleanError, EntryWarning, WarningKind};
pub use format::format_bytes;
pub use record::{LogAction, LogEntry, RunSummary, ScanResult};
