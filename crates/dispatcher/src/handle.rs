//! SinkHandle - a configured sink: level filter + formatter + backend

use std::sync::Arc;
use tracing::{error, trace};

use contracts::{ContractError, LogRecord, RecordSink, Severity};

use crate::formatter::Formatter;
use crate::metrics::SinkMetrics;

/// A sink as declared in the dispatch configuration
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Minimum severity this sink accepts
    level: Severity,
    /// Line template
    formatter: Formatter,
    /// Output backend
    backend: Box<dyn RecordSink>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
}

impl SinkHandle {
    /// Create a new SinkHandle
    pub fn new(
        name: impl Into<String>,
        level: Severity,
        formatter: Formatter,
        backend: Box<dyn RecordSink>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            formatter,
            backend,
            metrics: Arc::new(SinkMetrics::new()),
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Swap the output backend, returning the previous one
    pub fn replace_backend(&mut self, backend: Box<dyn RecordSink>) -> Box<dyn RecordSink> {
        std::mem::replace(&mut self.backend, backend)
    }

    /// Filter, format and write a record.
    ///
    /// Returns `Ok(false)` when the record is below this sink's level.
    pub fn deliver(&mut self, record: &LogRecord) -> Result<bool, ContractError> {
        if !record.severity.passes(self.level) {
            self.metrics.inc_filtered_count();
            trace!(sink = %self.name, severity = %record.severity, "Below sink level");
            return Ok(false);
        }

        let line = self.formatter.render(record);
        match self.backend.write_line(&line) {
            Ok(()) => {
                self.metrics.inc_write_count();
                Ok(true)
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                error!(sink = %self.name, error = %e, "Write failed");
                Err(e)
            }
        }
    }

    /// Flush the backend
    pub fn flush(&mut self) -> Result<(), ContractError> {
        self.backend.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;

    fn handle(level: Severity, backend: MemorySink) -> SinkHandle {
        let formatter = Formatter::compile("f", "{level}:{name}:{message}", None).unwrap();
        SinkHandle::new("mem", level, formatter, Box::new(backend))
    }

    #[test]
    fn test_sink_level_filter() {
        let mem = MemorySink::new("mem");
        let mut handle = handle(Severity::Warning, mem.clone());

        assert!(!handle
            .deliver(&LogRecord::new("app", Severity::Info, "quiet"))
            .unwrap());
        assert!(handle
            .deliver(&LogRecord::new("app", Severity::Warning, "loud"))
            .unwrap());

        assert_eq!(mem.lines(), vec!["WARNING:app:loud".to_string()]);
        let snapshot = handle.metrics().snapshot();
        assert_eq!(snapshot.write_count, 1);
        assert_eq!(snapshot.filtered_count, 1);
    }

    #[test]
    fn test_sink_failure_counted_and_returned() {
        let mut handle = handle(Severity::NotSet, MemorySink::failing("mem"));

        let err = handle
            .deliver(&LogRecord::new("app", Severity::Error, "boom"))
            .unwrap_err();
        assert!(matches!(err, ContractError::SinkWrite { .. }));
        assert_eq!(handle.metrics().failure_count(), 1);
        assert_eq!(handle.metrics().write_count(), 0);
    }

    #[test]
    fn test_replace_backend_keeps_level_and_formatter() {
        let mut handle = handle(Severity::Error, MemorySink::new("old"));
        let replacement = MemorySink::new("new");
        let old = handle.replace_backend(Box::new(replacement.clone()));
        assert_eq!(old.name(), "old");

        handle
            .deliver(&LogRecord::new("x", Severity::Warning, "dropped"))
            .unwrap();
        handle
            .deliver(&LogRecord::new("x", Severity::Critical, "kept"))
            .unwrap();
        assert_eq!(replacement.lines(), vec!["CRITICAL:x:kept".to_string()]);
    }
}
