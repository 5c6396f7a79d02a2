//! Registry error types
//!
//! Refusals such as "permission denied" are not errors; they are reported as
//! [`RegistrationOutcome`](crate::RegistrationOutcome) values. The variants
//! here cover persisted state and storage failures only.

use thiserror::Error;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Saved state could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Saved state decoded but violates a registry invariant.
    #[error("corrupt registry state: {0}")]
    CorruptState(String),

    /// Storage backend failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
