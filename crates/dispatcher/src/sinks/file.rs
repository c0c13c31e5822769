//! FileSink - appends lines to a file opened on first use

use contracts::{ContractError, RecordSink};
use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Sink that appends rendered lines to a file.
///
/// The file is opened lazily in append mode and kept open until the sink is
/// dropped; each line is flushed as it is written.
pub struct FileSink {
    name: String,
    path: PathBuf,
    writer: Option<LineWriter<File>>,
}

impl FileSink {
    /// Create a new FileSink. Does not touch the filesystem.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            writer: None,
        }
    }

    /// Whether the destination has been opened yet
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    #[instrument(name = "file_sink_open", skip(self), fields(sink = %self.name, path = %self.path.display()))]
    fn open(&mut self) -> Result<&mut LineWriter<File>, ContractError> {
        if self.writer.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|e| {
                    error!(sink = %self.name, error = %e, "Open failed");
                    ContractError::sink_write(
                        &self.name,
                        format!("cannot open '{}': {e}", self.path.display()),
                    )
                })?;
            debug!(sink = %self.name, "FileSink opened");
            self.writer = Some(LineWriter::new(file));
        }

        self.writer
            .as_mut()
            .ok_or_else(|| ContractError::sink_write(&self.name, "file not open"))
    }
}

impl RecordSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_line(&mut self, line: &str) -> Result<(), ContractError> {
        let name = self.name.clone();
        let writer = self.open()?;
        writeln!(writer, "{line}").map_err(|e| {
            error!(sink = %name, error = %e, "Write failed");
            ContractError::sink_write(name, e.to_string())
        })
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        match self.writer.as_mut() {
            Some(writer) => writer
                .flush()
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Err(e) = RecordSink::flush(self) {
            error!(sink = %self.name, error = %e, "Flush failed on close");
        }
    }
}
