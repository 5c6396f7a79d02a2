//! CLI error types

use chestlock_registry::RegistryError;
use thiserror::Error;

/// CLI error types
///
/// Refused registry operations are not errors; they are printed and the
/// command still succeeds.
#[derive(Debug, Error)]
pub enum CliError {
    /// Registry load, save or decode failure
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
