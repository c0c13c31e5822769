//! DispatchSpec - Config Loader output
//!
//! 声明式日志分发配置：formatters、sinks、loggers。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{ContractError, Severity};

/// Name of the root (default) logger
pub const ROOT_LOGGER: &str = "";

/// Template used by sinks that do not reference a formatter
pub const DEFAULT_FORMAT: &str = "{message}";

/// Default strftime pattern for `{timestamp}`
pub const DEFAULT_DATEFMT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// 配置版本 (only `1` is accepted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ConfigVersion {
    #[default]
    V1,
}

impl TryFrom<u32> for ConfigVersion {
    type Error = ContractError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            other => Err(ContractError::config_validation(
                "version",
                format!("unsupported config version {other}, expected 1"),
            )),
        }
    }
}

impl From<ConfigVersion> for u32 {
    fn from(version: ConfigVersion) -> Self {
        match version {
            ConfigVersion::V1 => 1,
        }
    }
}

/// 完整的日志分发配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchSpec {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 格式模板 (name -> formatter)
    #[serde(default)]
    pub formatters: BTreeMap<String, FormatterSpec>,

    /// 输出目标 (name -> sink)
    #[serde(default, alias = "handlers")]
    pub sinks: BTreeMap<String, SinkSpec>,

    /// 命名 logger (name -> logger), `""` 为 root
    #[serde(default)]
    pub loggers: BTreeMap<String, LoggerSpec>,

    /// root logger 的另一种写法，与 `loggers[""]` 互斥
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<LoggerSpec>,
}

impl DispatchSpec {
    /// Empty version-1 spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a formatter
    pub fn formatter(mut self, name: impl Into<String>, formatter: FormatterSpec) -> Self {
        self.formatters.insert(name.into(), formatter);
        self
    }

    /// Add a sink
    pub fn sink(mut self, name: impl Into<String>, sink: SinkSpec) -> Self {
        self.sinks.insert(name.into(), sink);
        self
    }

    /// Add a logger (`""` for the root)
    pub fn logger(mut self, name: impl Into<String>, logger: LoggerSpec) -> Self {
        self.loggers.insert(name.into(), logger);
        self
    }

    /// The declared root logger, if any, from either position.
    ///
    /// # Errors
    /// Returns a validation error if the root is declared both as
    /// `loggers[""]` and as `root`.
    pub fn root_logger(&self) -> Result<Option<&LoggerSpec>, ContractError> {
        match (self.loggers.get(ROOT_LOGGER), self.root.as_ref()) {
            (Some(_), Some(_)) => Err(ContractError::config_validation(
                "root",
                "root logger declared both as loggers[\"\"] and as root",
            )),
            (Some(root), None) | (None, Some(root)) => Ok(Some(root)),
            (None, None) => Ok(None),
        }
    }

    /// Non-root loggers in name order
    pub fn named_loggers(&self) -> impl Iterator<Item = (&String, &LoggerSpec)> {
        self.loggers
            .iter()
            .filter(|(name, _)| name.as_str() != ROOT_LOGGER)
    }
}

/// 格式模板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatterSpec {
    /// Template with `{timestamp}` `{name}` `{level}` `{message}` placeholders
    pub format: String,

    /// strftime pattern for `{timestamp}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datefmt: Option<String>,
}

impl FormatterSpec {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            datefmt: None,
        }
    }

    pub fn with_datefmt(mut self, datefmt: impl Into<String>) -> Self {
        self.datefmt = Some(datefmt.into());
        self
    }
}

/// Sink 输出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkSpec {
    /// Sink 类型
    pub kind: SinkKind,

    /// console: `stdout` / `stderr`; file: 文件路径 (必填)
    #[serde(default, alias = "filename", skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// 最低输出级别
    #[serde(default)]
    pub level: Severity,

    /// 引用的 formatter 名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
}

impl SinkSpec {
    /// Console sink writing to stderr
    pub fn console() -> Self {
        Self {
            kind: SinkKind::Console,
            destination: None,
            level: Severity::NotSet,
            formatter: None,
        }
    }

    /// File sink appending to `path`
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            kind: SinkKind::File,
            destination: Some(path.into()),
            level: Severity::NotSet,
            formatter: None,
        }
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    pub fn with_formatter(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// 标准输出 / 标准错误
    Console,
    /// 追加写文件
    File,
}

/// Logger 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerSpec {
    /// 引用的 sink 名称 (有序)
    #[serde(default, alias = "handlers")]
    pub sinks: Vec<String>,

    /// 最低级别；未设置时 root 为 WARNING，其它为 NOTSET
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Severity>,

    /// 是否同时交给 root logger
    #[serde(default = "default_propagate")]
    pub propagate: bool,
}

fn default_propagate() -> bool {
    true
}

impl Default for LoggerSpec {
    fn default() -> Self {
        Self {
            sinks: Vec::new(),
            level: None,
            propagate: true,
        }
    }
}

impl LoggerSpec {
    /// Logger at `level` writing to `sinks`
    pub fn new<I, S>(sinks: I, level: Severity) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sinks: sinks.into_iter().map(Into::into).collect(),
            level: Some(level),
            propagate: true,
        }
    }

    pub fn with_propagate(mut self, propagate: bool) -> Self {
        self.propagate = propagate;
        self
    }

    /// Level applied when filtering, honouring the per-position default
    pub fn effective_level(&self, is_root: bool) -> Severity {
        match self.level {
            Some(level) => level,
            None if is_root => Severity::Warning,
            None => Severity::NotSet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_matches_deserialized() {
        let built = DispatchSpec::new()
            .formatter("simple", FormatterSpec::new("{name} - {message}"))
            .sink("file", SinkSpec::file("app.log").with_formatter("simple"))
            .logger("", LoggerSpec::new(["file"], Severity::Debug));

        let json = r#"{
            "version": 1,
            "formatters": { "simple": { "format": "{name} - {message}" } },
            "handlers": { "file": { "kind": "file", "filename": "app.log", "formatter": "simple" } },
            "loggers": { "": { "handlers": ["file"], "level": "DEBUG" } }
        }"#;
        let parsed: DispatchSpec = serde_json::from_str(json).unwrap();

        assert_eq!(built, parsed);
    }

    #[test]
    fn test_version_must_be_one() {
        let err = serde_json::from_str::<DispatchSpec>(r#"{ "version": 2 }"#).unwrap_err();
        assert!(err.to_string().contains("unsupported config version"));
    }

    #[test]
    fn test_root_logger_positions() {
        let spec = DispatchSpec::new().logger("", LoggerSpec::default());
        assert!(spec.root_logger().unwrap().is_some());

        let mut spec = DispatchSpec::new();
        spec.root = Some(LoggerSpec::default());
        assert!(spec.root_logger().unwrap().is_some());

        let mut both = DispatchSpec::new().logger("", LoggerSpec::default());
        both.root = Some(LoggerSpec::default());
        assert!(both.root_logger().is_err());

        assert!(DispatchSpec::new().root_logger().unwrap().is_none());
    }

    #[test]
    fn test_effective_level_defaults() {
        let logger = LoggerSpec::default();
        assert_eq!(logger.effective_level(true), Severity::Warning);
        assert_eq!(logger.effective_level(false), Severity::NotSet);

        let explicit = LoggerSpec::new(Vec::<String>::new(), Severity::Error);
        assert_eq!(explicit.effective_level(true), Severity::Error);
    }

    #[test]
    fn test_toml_quoted_root_key() {
        let content = r#"
[sinks.console]
kind = "console"
destination = "stdout"

[loggers.""]
sinks = ["console"]
level = "info"

[loggers."app.member"]
sinks = ["console"]
propagate = false
"#;
        let spec: DispatchSpec = toml::from_str(content).unwrap();
        assert_eq!(spec.loggers.len(), 2);
        assert!(!spec.loggers["app.member"].propagate);
        assert_eq!(spec.named_loggers().count(), 1);
    }
}
