//! RecordSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for sink backends.

use crate::ContractError;

/// Line-oriented output backend.
///
/// Level filtering and formatting happen in the dispatcher; a backend only
/// receives fully rendered lines (without trailing newline).
pub trait RecordSink: Send {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one rendered line
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn write_line(&mut self, line: &str) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    fn flush(&mut self) -> Result<(), ContractError>;
}
