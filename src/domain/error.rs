//! Error taxonomy for store operations.
//!
//! Validation failures are raised before storage is touched; duplicate keys
//! and storage failures are surfaced verbatim so the caller can report them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Customer ID already exists: {0}")]
    DuplicateKey(String),

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}
