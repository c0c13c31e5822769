//! # Dispatcher
//!
//! 日志分发模块。
//!
//! 负责：
//! - 从 `DispatchSpec` 构建 logger 路由表
//! - 按最长前缀匹配选择 logger，并独立交给 root
//! - 按 sink 级别过滤、格式化、写出

pub mod formatter;
pub mod handle;
pub mod metrics;
pub mod registry;
pub mod sinks;

pub use contracts::{LogRecord, RecordSink, Severity};
pub use formatter::Formatter;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use registry::{DispatchRegistry, LoggerHandle};
pub use sinks::{ConsoleSink, ConsoleTarget, FileSink, MemorySink};
