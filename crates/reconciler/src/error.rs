//! Error types for the reconciler crate.

use thiserror::Error;
use vigil_core::ObjectKey;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for resource store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Reconciler error types.
///
/// Collaborator failures pass through unchanged so the caller's retry policy
/// sees the original cause.
#[derive(Debug, Error)]
pub enum Error {
    /// The resource store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The external monitoring service failed.
    #[error(transparent)]
    Monitor(#[from] vigil_healthchecks::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create an invalid config error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether the error is the store reporting a missing record.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound { .. }))
    }
}

/// Errors returned by a resource store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The record does not exist.
    #[error("check '{key}' not found")]
    NotFound { key: ObjectKey },

    /// The record already exists.
    #[error("check '{key}' already exists")]
    AlreadyExists { key: ObjectKey },

    /// The write was based on a stale resource version.
    #[error("conflict writing check '{key}': expected version {expected}, found {actual}")]
    Conflict {
        key: ObjectKey,
        expected: u64,
        actual: u64,
    },

    /// The backing storage failed.
    #[error("store backend failed: {reason}")]
    Backend { reason: String },
}

impl StoreError {
    /// Create a not found error.
    pub const fn not_found(key: ObjectKey) -> Self {
        Self::NotFound { key }
    }

    /// Create an already exists error.
    pub const fn already_exists(key: ObjectKey) -> Self {
        Self::AlreadyExists { key }
    }

    /// Create a conflict error.
    pub const fn conflict(key: ObjectKey, expected: u64, actual: u64) -> Self {
        Self::Conflict {
            key,
            expected,
            actual,
        }
    }

    /// Create a backend error.
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}
