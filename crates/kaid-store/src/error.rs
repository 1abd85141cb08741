//! Store error types

use thiserror::Error;

/// Errors reported by a persistence backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed record does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The write would violate a uniqueness constraint
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// The backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure
    #[error("Store error: {0}")]
    Internal(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Whether the failure is worth retrying at the transport layer.
    ///
    /// The access core itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}
