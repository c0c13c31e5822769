//! MemorySink - keeps lines in a shared buffer

use contracts::{ContractError, RecordSink};
use std::sync::{Arc, Mutex};

/// Sink that stores rendered lines in memory.
///
/// Clones share the same buffer, so a caller can keep one clone and hand
/// the other to a registry via `DispatchRegistry::replace_sink`.
#[derive(Clone, Default)]
pub struct MemorySink {
    name: String,
    lines: Arc<Mutex<Vec<String>>>,
    fail_writes: bool,
}

impl MemorySink {
    /// Create a new MemorySink
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A sink whose writes always fail
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            fail_writes: true,
            ..Self::new(name)
        }
    }

    /// Lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Number of lines written so far
    pub fn len(&self) -> usize {
        self.lines.lock().map(|lines| lines.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_line(&mut self, line: &str) -> Result<(), ContractError> {
        if self.fail_writes {
            return Err(ContractError::sink_write(&self.name, "memory sink rejects writes"));
        }
        self.lines
            .lock()
            .map_err(|_| ContractError::sink_write(&self.name, "buffer lock poisoned"))?
            .push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
