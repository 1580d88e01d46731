//! Core error types for vigil.
//!
//! All errors are explicit, typed, and recoverable - no panics allowed.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vigil operations.
#[derive(Debug, Error)]
pub enum Error {
    // I/O errors
    #[error("failed to read file '{path}': {reason}")]
    FileReadFailed { path: PathBuf, reason: String },

    // Parsing errors
    #[error("manifest parse error in document {document}: {reason}")]
    ManifestParseFailed { document: usize, reason: String },

    // Registry errors
    #[error("kind '{kind}' in '{api_version}' is not registered")]
    UnknownKind { api_version: String, kind: String },

    // Record errors
    #[error("duplicate record '{key}'")]
    DuplicateRecord { key: String },

    #[error("invalid record: {reason}")]
    InvalidRecord { reason: String },
}

impl Error {
    /// Create a file read error.
    pub fn file_read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a manifest parse error for the zero-based document index.
    pub fn manifest_parse_failed(document: usize, reason: impl Into<String>) -> Self {
        Self::ManifestParseFailed {
            document,
            reason: reason.into(),
        }
    }

    /// Create an unknown kind error.
    pub fn unknown_kind(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnknownKind {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }

    /// Create a duplicate record error.
    pub fn duplicate_record(key: impl Into<String>) -> Self {
        Self::DuplicateRecord { key: key.into() }
    }

    /// Create an invalid record error.
    pub fn invalid_record(reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            reason: reason.into(),
        }
    }
}
