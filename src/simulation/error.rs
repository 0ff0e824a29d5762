//! Error types for the simulation control surface.
//!
//! Numerical trouble inside a step is handled with guard clauses and never
//! surfaces here. These errors cover rejected input, persistence failures,
//! and the corrupted-world condition that requires a reset.

use thiserror::Error;

/// Main error type for world operations.
#[derive(Error, Debug)]
pub enum SimError {
    /// Rejected input at the control surface (counts, geometry, parameters).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File system errors while saving or loading.
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A snapshot parsed but its contents cannot rebuild a valid world.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// A step left entity state non-finite. The world must be reset.
    #[error("World corrupted: {0}")]
    Corrupted(String),
}

/// Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    /// Creates a new invalid input error.
    #[must_use]
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a new snapshot error.
    #[must_use]
    pub fn snapshot<S: Into<String>>(msg: S) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Creates a new corruption error.
    #[must_use]
    pub fn corrupted<S: Into<String>>(msg: S) -> Self {
        Self::Corrupted(msg.into())
    }
}
