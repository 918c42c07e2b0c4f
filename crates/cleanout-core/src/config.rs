//! Cleanup run configuration.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::CleanError;

/// Default age threshold, in days.
pub const DEFAULT_THRESHOLD_DAYS: u32 = 7;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Configuration for a single cleanup run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CleanConfig {
    /// Directory to scan.
    pub root: PathBuf,

    /// Files last modified more than this many days ago are marked.
    #[builder(default = "DEFAULT_THRESHOLD_DAYS")]
    #[serde(default = "default_threshold_days")]
    pub threshold_days: u32,

    /// Report marked files without removing them.
    #[builder(default = "false")]
    #[serde(default)]
    pub dry_run: bool,

    /// Emit per-entry progress events.
    #[builder(default = "false")]
    #[serde(default)]
    pub verbose: bool,

    /// Instant the cutoff is measured back from (default: now).
    #[builder(default = "SystemTime::now()")]
    #[serde(default = "std::time::SystemTime::now")]
    pub reference_time: SystemTime,
}

fn default_threshold_days() -> u32 {
    DEFAULT_THRESHOLD_DAYS
}

impl CleanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                Err("Root path cannot be empty".to_string())
            }
            Some(_) => Ok(()),
            None => Err("Root path is required".to_string()),
        }
    }
}

impl From<CleanConfigBuilderError> for CleanError {
    fn from(err: CleanConfigBuilderError) -> Self {
        CleanError::InvalidConfig {
            message: err.to_string(),
        }
    }
}

impl CleanConfig {
    /// Create a new config builder.
    pub fn builder() -> CleanConfigBuilder {
        CleanConfigBuilder::default()
    }

    /// Create a live-mode config for a path with the default threshold.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            dry_run: false,
            verbose: false,
            reference_time: SystemTime::now(),
        }
    }

    /// The age window as a duration.
    pub fn threshold(&self) -> Duration {
        Duration::from_secs(u64::from(self.threshold_days) * SECONDS_PER_DAY)
    }

    /// Instant before which a file's modification time qualifies it for deletion.
    ///
    /// Saturates at the Unix epoch for thresholds reaching further back.
    pub fn cutoff(&self) -> SystemTime {
        self.reference_time
            .checked_sub(self.threshold())
            .unwrap_or(UNIX_EPOCH)
    }

    /// Whether a modification time falls strictly before the cutoff.
    pub fn is_expired(&self, modified: SystemTime) -> bool {
        modified < self.cutoff()
    }
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}
