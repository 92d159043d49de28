//! Custom error types for SaveKeeper
//!
//! Whole-operation failures are `SaveKeeperError`s. Failures that only affect a
//! single file inside a batch are collected as [`FileFailure`]s in the batch
//! report instead, so one bad file never aborts an otherwise good pass.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// The main error type for SaveKeeper operations
#[derive(Error, Debug)]
pub enum SaveKeeperError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configured value cannot be used to start a pass
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// A file name does not follow the archive naming scheme
    #[error("Not a valid archive name '{name}': {reason}")]
    Decode { name: String, reason: String },
}

impl SaveKeeperError {
    /// Create a "not found" error for archive entries
    pub fn entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Archive entry",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for day buckets
    pub fn bucket_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Bucket",
            identifier: identifier.into(),
        }
    }

    /// Create a decode error for the given file name
    pub fn decode(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an invalid configuration error
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }
}

impl From<std::io::Error> for SaveKeeperError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SaveKeeperError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for SaveKeeper operations
pub type SaveKeeperResult<T> = Result<T, SaveKeeperError>;

/// Category of a per-file failure recorded in a batch report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The source directory does not exist
    SourceUnavailable,
    /// Copying into the archive (or back out of it) failed
    CopyFailed,
    /// A file name does not decode as an archive name
    DecodeFailed,
    /// Removing an entry or a bucket directory failed
    DeleteFailed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::SourceUnavailable => write!(f, "source unavailable"),
            FailureKind::CopyFailed => write!(f, "copy failed"),
            FailureKind::DecodeFailed => write!(f, "decode failed"),
            FailureKind::DeleteFailed => write!(f, "delete failed"),
        }
    }
}

/// One file that could not be processed during a batch
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub reason: String,
}

impl FileFailure {
    pub fn new(path: impl Into<PathBuf>, kind: FailureKind, reason: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            kind,
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path.display(), self.kind, self.reason)
    }
}
