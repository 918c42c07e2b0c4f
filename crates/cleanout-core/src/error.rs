//! Error types for cleanup runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a run or an artifact write.
///
/// Problems with individual entries are not errors: they surface as
/// [`EntryWarning`]s and the walk continues.
#[derive(Debug, Error)]
pub enum CleanError {
    /// The root path does not exist or cannot be statted.
    #[error("Directory is not accessible: {path}: {source}")]
    RootInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The log artifact could not be written.
    #[error("Failed to write log file {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CleanError {
    /// Create a root access error.
    pub fn root_inaccessible(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::RootInaccessible {
            path: path.into(),
            source,
        }
    }

    /// Create an artifact persistence error.
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}

/// Kind of entry warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// The entry disappeared between listing and inspection.
    Vanished,
    /// Error reading a directory listing.
    ReadError,
    /// Error reading metadata.
    MetadataError,
}

/// Non-fatal problem with a single entry encountered during a walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl EntryWarning {
    /// Create a new entry warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Classify an I/O error, using `fallback` when the kind is not specific.
    pub fn from_io(path: impl Into<PathBuf>, error: &std::io::Error, fallback: WarningKind) -> Self {
        let kind = match error.kind() {
            std::io::ErrorKind::PermissionDenied => WarningKind::PermissionDenied,
            std::io::ErrorKind::NotFound => WarningKind::Vanished,
            _ => fallback,
        };
        Self::new(path, error.to_string(), kind)
    }
}

impl std::fmt::Display for EntryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_from_io() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let warning = EntryWarning::from_io("/test/path", &err, WarningKind::ReadError);
        assert_eq!(warning.kind, WarningKind::PermissionDenied);

        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let warning = EntryWarning::from_io("/test/path", &err, WarningKind::MetadataError);
        assert_eq!(warning.kind, WarningKind::Vanished);

        let err = std::io::Error::other("weird");
        let warning = EntryWarning::from_io("/test/path", &err, WarningKind::MetadataError);
        assert_eq!(warning.kind, WarningKind::MetadataError);
        assert_eq!(warning.to_string(), "/test/path: weird");
    }

    #[test]
    fn test_error_messages_name_the_path() {
        let io = || std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = CleanError::root_inaccessible("/nope", io());
        assert_eq!(err.to_string(), "Directory is not accessible: /nope: missing");
        let err = CleanError::persistence("logs/x.log", io());
        assert!(err.to_string().starts_with("Failed to write log file logs/x.log"));
    }
}
