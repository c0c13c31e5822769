//! ConsoleSink - writes lines to stdout or stderr

use contracts::{ContractError, RecordSink};
use std::io::{self, Write};
use std::str::FromStr;

/// Standard stream a console sink writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    Stdout,
    /// Default, matching the usual stream handler behaviour
    #[default]
    Stderr,
}

impl FromStr for ConsoleTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" | "ext://sys.stdout" => Ok(Self::Stdout),
            "stderr" | "ext://sys.stderr" => Ok(Self::Stderr),
            other => Err(format!(
                "unknown console destination '{other}', expected 'stdout' or 'stderr'"
            )),
        }
    }
}

/// Sink that prints rendered lines to a standard stream
pub struct ConsoleSink {
    name: String,
    target: ConsoleTarget,
}

impl ConsoleSink {
    /// Create a new ConsoleSink
    pub fn new(name: impl Into<String>, target: ConsoleTarget) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    fn write_to(&self, line: &str) -> io::Result<()> {
        match self.target {
            ConsoleTarget::Stdout => writeln!(io::stdout().lock(), "{line}"),
            ConsoleTarget::Stderr => writeln!(io::stderr().lock(), "{line}"),
        }
    }
}

impl RecordSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_line(&mut self, line: &str) -> Result<(), ContractError> {
        self.write_to(line)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        let result = match self.target {
            ConsoleTarget::Stdout => io::stdout().flush(),
            ConsoleTarget::Stderr => io::stderr().flush(),
        };
        result.map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }
}
