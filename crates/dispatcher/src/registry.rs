//! DispatchRegistry - named-logger routing table

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, instrument, trace};

use contracts::{
    ContractError, DispatchSpec, LogRecord, LoggerSpec, RecordSink, Severity, SinkKind,
    SinkSpec, ROOT_LOGGER,
};

use crate::formatter::Formatter;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{ConsoleSink, ConsoleTarget, FileSink};

const ROOT_INDEX: usize = 0;

/// A resolved logger entry
#[derive(Debug, Clone)]
struct LoggerEntry {
    name: String,
    level: Severity,
    /// Indices into `DispatchRegistry::sinks`, in declaration order
    sinks: Vec<usize>,
    propagate: bool,
}

/// Handle returned by [`DispatchRegistry::get_logger`].
///
/// Only valid for the registry that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerHandle {
    requested: String,
    matched: String,
    entry: usize,
}

impl LoggerHandle {
    /// The name passed to `get_logger`; rendered as `{name}`
    pub fn name(&self) -> &str {
        &self.requested
    }

    /// The registered logger this handle is bound to (`""` for root)
    pub fn matched_name(&self) -> &str {
        &self.matched
    }

    /// Whether the handle fell back to the root logger
    pub fn is_root(&self) -> bool {
        self.entry == ROOT_INDEX
    }
}

/// Routing table built from a [`DispatchSpec`].
///
/// Records emitted through a handle go to the matched logger's sinks and,
/// unless it opts out via `propagate = false`, independently to the root
/// logger's sinks. A sink attached to both receives the record twice.
pub struct DispatchRegistry {
    sinks: Vec<SinkHandle>,
    sink_index: HashMap<String, usize>,
    /// `loggers[ROOT_INDEX]` is always the root
    loggers: Vec<LoggerEntry>,
    logger_index: HashMap<String, usize>,
}

impl DispatchRegistry {
    /// Build a registry from a spec.
    ///
    /// No I/O happens here; file sinks open on first write.
    ///
    /// # Errors
    /// Returns a validation error, and no registry, if a logger references
    /// an undeclared sink, a sink references an undeclared formatter, a file
    /// sink has no destination, a console destination is unknown, a
    /// template is malformed, or the root logger is declared twice.
    #[instrument(
        name = "dispatch_registry_configure",
        skip(spec),
        fields(
            formatters = spec.formatters.len(),
            sinks = spec.sinks.len(),
            loggers = spec.loggers.len()
        )
    )]
    pub fn configure(spec: &DispatchSpec) -> Result<Self, ContractError> {
        let root_spec = spec.root_logger()?;
        let formatters = Self::compile_formatters(spec)?;

        let mut sinks = Vec::with_capacity(spec.sinks.len());
        let mut sink_index = HashMap::with_capacity(spec.sinks.len());
        for (name, sink_spec) in &spec.sinks {
            let handle = create_sink_handle(name, sink_spec, &formatters)?;
            sink_index.insert(name.clone(), sinks.len());
            sinks.push(handle);
        }

        let implicit_root = LoggerSpec::default();
        let root = resolve_logger(ROOT_LOGGER, root_spec.unwrap_or(&implicit_root), &sink_index)?;

        let mut loggers = vec![root];
        let mut logger_index = HashMap::new();
        logger_index.insert(ROOT_LOGGER.to_string(), ROOT_INDEX);
        for (name, logger_spec) in spec.named_loggers() {
            let entry = resolve_logger(name, logger_spec, &sink_index)?;
            logger_index.insert(name.clone(), loggers.len());
            loggers.push(entry);
        }

        info!(
            sinks = sinks.len(),
            loggers = loggers.len(),
            "Dispatch registry configured"
        );

        Ok(Self {
            sinks,
            sink_index,
            loggers,
            logger_index,
        })
    }

    fn compile_formatters(
        spec: &DispatchSpec,
    ) -> Result<BTreeMap<&str, Formatter>, ContractError> {
        spec.formatters
            .iter()
            .map(|(name, f)| {
                let field = format!("formatters[{name}]");
                Formatter::compile(&field, &f.format, f.datefmt.as_deref())
                    .map(|compiled| (name.as_str(), compiled))
            })
            .collect()
    }

    /// Bind `name` to the longest registered logger that is a
    /// component-wise prefix of it, falling back to the root.
    ///
    /// `"app.member.xx"` matches `"app.member"`; `"app.members"` does not.
    pub fn get_logger(&self, name: &str) -> LoggerHandle {
        let entry = self.lookup(name);
        LoggerHandle {
            requested: name.to_string(),
            matched: self.loggers[entry].name.clone(),
            entry,
        }
    }

    fn lookup(&self, name: &str) -> usize {
        let mut candidate = name;
        loop {
            if candidate.is_empty() {
                return ROOT_INDEX;
            }
            if let Some(&idx) = self.logger_index.get(candidate) {
                return idx;
            }
            match candidate.rfind('.') {
                Some(pos) => candidate = &candidate[..pos],
                None => return ROOT_INDEX,
            }
        }
    }

    /// Emit a record through `handle`.
    ///
    /// Returns the number of lines written.
    ///
    /// # Errors
    /// Returns the first sink write failure; later sinks are not attempted.
    pub fn emit(
        &mut self,
        handle: &LoggerHandle,
        severity: Severity,
        message: impl Into<String>,
    ) -> Result<usize, ContractError> {
        let entry = self
            .loggers
            .get(handle.entry)
            .filter(|entry| entry.name == handle.matched)
            .ok_or_else(|| {
                ContractError::Other(format!(
                    "logger handle '{}' does not belong to this registry",
                    handle.requested
                ))
            })?;

        let mut targets: Vec<usize> = Vec::new();
        if severity.passes(entry.level) {
            targets.extend_from_slice(&entry.sinks);
        }
        if handle.entry != ROOT_INDEX && entry.propagate {
            let root = &self.loggers[ROOT_INDEX];
            if severity.passes(root.level) {
                targets.extend_from_slice(&root.sinks);
            }
        }

        if targets.is_empty() {
            trace!(logger = %handle.requested, %severity, "No qualifying logger");
            return Ok(0);
        }

        let record = LogRecord::new(&handle.requested, severity, message);
        let mut written = 0;
        for idx in targets {
            if self.sinks[idx].deliver(&record)? {
                written += 1;
            }
        }
        trace!(logger = %handle.requested, %severity, written, "Record emitted");
        Ok(written)
    }

    pub fn debug(&mut self, handle: &LoggerHandle, message: impl Into<String>) -> Result<usize, ContractError> {
        self.emit(handle, Severity::Debug, message)
    }

    pub fn info(&mut self, handle: &LoggerHandle, message: impl Into<String>) -> Result<usize, ContractError> {
        self.emit(handle, Severity::Info, message)
    }

    pub fn warning(&mut self, handle: &LoggerHandle, message: impl Into<String>) -> Result<usize, ContractError> {
        self.emit(handle, Severity::Warning, message)
    }

    pub fn error(&mut self, handle: &LoggerHandle, message: impl Into<String>) -> Result<usize, ContractError> {
        self.emit(handle, Severity::Error, message)
    }

    pub fn critical(&mut self, handle: &LoggerHandle, message: impl Into<String>) -> Result<usize, ContractError> {
        self.emit(handle, Severity::Critical, message)
    }

    /// Swap the backend of sink `name`, keeping its level and formatter.
    ///
    /// Returns the previous backend, or `None` if no such sink exists.
    pub fn replace_sink(
        &mut self,
        name: &str,
        backend: Box<dyn RecordSink>,
    ) -> Option<Box<dyn RecordSink>> {
        let idx = *self.sink_index.get(name)?;
        debug!(sink = %name, "Sink backend replaced");
        Some(self.sinks[idx].replace_backend(backend))
    }

    /// Registered logger names (root first, as `""`)
    pub fn logger_names(&self) -> impl Iterator<Item = &str> {
        self.loggers.iter().map(|entry| entry.name.as_str())
    }

    /// Declared sink names in name order
    pub fn sink_names(&self) -> impl Iterator<Item = &str> {
        self.sinks.iter().map(SinkHandle::name)
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.sinks
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Flush every sink, returning the first failure
    pub fn flush(&mut self) -> Result<(), ContractError> {
        self.sinks.iter_mut().try_for_each(SinkHandle::flush)
    }
}

/// Create a SinkHandle from configuration
fn create_sink_handle(
    name: &str,
    spec: &SinkSpec,
    formatters: &BTreeMap<&str, Formatter>,
) -> Result<SinkHandle, ContractError> {
    let formatter = match spec.formatter.as_deref() {
        Some(formatter_name) => formatters.get(formatter_name).cloned().ok_or_else(|| {
            ContractError::config_validation(
                format!("sinks[{name}].formatter"),
                format!("undeclared formatter '{formatter_name}'"),
            )
        })?,
        None => Formatter::plain(),
    };

    let backend: Box<dyn RecordSink> = match spec.kind {
        SinkKind::Console => {
            let target = match spec.destination.as_deref() {
                Some(destination) => destination.parse::<ConsoleTarget>().map_err(|message| {
                    ContractError::config_validation(format!("sinks[{name}].destination"), message)
                })?,
                None => ConsoleTarget::default(),
            };
            Box::new(ConsoleSink::new(name, target))
        }
        SinkKind::File => {
            let path = spec
                .destination
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .ok_or_else(|| {
                    ContractError::config_validation(
                        format!("sinks[{name}].destination"),
                        "file sink requires a destination path",
                    )
                })?;
            Box::new(FileSink::new(name, path))
        }
    };

    Ok(SinkHandle::new(name, spec.level, formatter, backend))
}

fn resolve_logger(
    name: &str,
    spec: &LoggerSpec,
    sink_index: &HashMap<String, usize>,
) -> Result<LoggerEntry, ContractError> {
    let sinks = spec
        .sinks
        .iter()
        .map(|sink| {
            sink_index.get(sink).copied().ok_or_else(|| {
                ContractError::config_validation(
                    format!("loggers[{name:?}].sinks"),
                    format!("undeclared sink '{sink}'"),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LoggerEntry {
        name: name.to_string(),
        level: spec.effective_level(name == ROOT_LOGGER),
        sinks,
        propagate: spec.propagate,
    })
}
