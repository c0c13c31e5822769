//! Layered error definitions
//!
//! Categorized by source: config / sink / fetch

use thiserror::Error;

/// Unified error type for configuration and log dispatch
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised while building a registry
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. } | Self::ConfigValidation { .. }
        )
    }
}

/// Errors confined to a single fetch task.
///
/// A settled task keeps its failure; `FetchTask::result` hands out clones.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure (connect, TLS, broken body)
    #[error("task {task_id}: request to '{url}' failed: {message}")]
    Transport {
        task_id: usize,
        url: String,
        message: String,
    },

    /// The task panicked or was aborted before settling
    #[error("task {task_id}: join error: {message}")]
    Join { task_id: usize, message: String },

    /// Result requested before the task settled
    #[error("task {task_id} has not settled")]
    NotSettled { task_id: usize },

    /// Runtime or HTTP client could not be constructed
    #[error("fetch runtime error: {message}")]
    Runtime { message: String },
}

impl FetchError {
    /// Create transport error
    pub fn transport(task_id: usize, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            task_id,
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }
}
