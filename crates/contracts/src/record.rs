//! LogRecord - one emitted log event

use chrono::{DateTime, Local};

use crate::Severity;

/// A single log event, created once per `emit` call.
///
/// The timestamp is captured at creation so every sink that receives the
/// record renders the same instant.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Creation time (local clock)
    pub timestamp: DateTime<Local>,
    /// Name the caller asked for (not the matched registry entry)
    pub logger_name: String,
    /// Record severity
    pub severity: Severity,
    /// Message text
    pub message: String,
}

impl LogRecord {
    /// Create a record stamped with the current time
    pub fn new(
        logger_name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self::with_timestamp(Local::now(), logger_name, severity, message)
    }

    /// Create a record with an explicit timestamp
    pub fn with_timestamp(
        timestamp: DateTime<Local>,
        logger_name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            logger_name: logger_name.into(),
            severity,
            message: message.into(),
        }
    }
}
