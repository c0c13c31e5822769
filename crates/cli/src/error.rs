//! Error types for CLI operations.

use contracts::{ContractError, FetchError};
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or applied
    #[error("Dispatch configuration error: {0}")]
    Config(#[from] ContractError),

    /// Fetch batch could not be started
    #[error("Fetch batch failed: {0}")]
    Fetch(#[from] FetchError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
