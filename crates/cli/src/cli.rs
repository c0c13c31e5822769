//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::{Severity, DEFAULT_TARGET, DEFAULT_TASK_COUNT};
use observability::ObservabilityConfig;
use std::path::PathBuf;

/// logfetch - named-logger dispatch and concurrent fetch utilities
#[derive(Parser, Debug)]
#[command(
    name = "logfetch",
    author,
    version,
    about = "Logger dispatch configurator and concurrent HTTP fetch runner",
    long_about = "Two small utilities in one binary.\n\n\
                  `dispatch` routes a log record through a declarative logger \n\
                  configuration; `fetch` issues a batch of concurrent GET requests \n\
                  and reports each status and the total elapsed time."
)]
pub struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOGFETCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Diagnostic log format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "LOGFETCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "LOGFETCH_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Diagnostic logging settings derived from the global flags
    pub fn observability_config(&self) -> ObservabilityConfig {
        let default_log_level = if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };

        ObservabilityConfig {
            log_format: self.log_format.into(),
            metrics_port: (self.metrics_port != 0).then_some(self.metrics_port),
            default_log_level: default_log_level.to_string(),
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Emit one record through a dispatch configuration
    Dispatch(DispatchArgs),

    /// Run a batch of concurrent GET requests
    Fetch(FetchArgs),

    /// Validate a dispatch configuration file
    Validate(ValidateArgs),
}

/// Arguments for the `dispatch` command
#[derive(Parser, Debug, Clone)]
pub struct DispatchArgs {
    /// Dispatch configuration (TOML or JSON); built-in demo config if omitted
    #[arg(short, long, env = "LOGFETCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logger name to emit through
    #[arg(short, long, default_value = "app.member.xx")]
    pub logger: String,

    /// Record severity (name or number)
    #[arg(long, default_value = "warning")]
    pub level: Severity,

    /// Message text
    #[arg(default_value = "member")]
    pub message: String,
}

/// Arguments for the `fetch` command
#[derive(Parser, Debug, Clone)]
pub struct FetchArgs {
    /// Number of concurrent requests
    #[arg(short = 'n', long, default_value_t = DEFAULT_TASK_COUNT, env = "LOGFETCH_FETCH_COUNT")]
    pub count: usize,

    /// URL every request targets
    #[arg(short, long, default_value = DEFAULT_TARGET, env = "LOGFETCH_FETCH_URL")]
    pub url: String,

    /// Print a latency and status-code summary after the batch
    #[arg(long)]
    pub summary: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "logging.toml", env = "LOGFETCH_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
