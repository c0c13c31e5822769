//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON dispatch configuration files
//! - Validate configuration well-formedness
//! - Generate `DispatchSpec`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let spec = ConfigLoader::load_from_path(Path::new("logging.toml")).unwrap();
//! println!("Loggers: {}", spec.loggers.len());
//! ```

mod parser;
mod validator;

pub use contracts::DispatchSpec;
pub use parser::ConfigFormat;
pub use validator::validate;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Built-in configuration used when no config file is given.
///
/// Root writes to `logging.log`; `error` and `app.member` also write to
/// stderr.
pub const DEMO_CONFIG_TOML: &str = r#"
version = 1

[formatters.simple]
format = "%(asctime)s - %(name)s - %(levelname)s - %(message)s"

[sinks.console]
kind = "console"
destination = "stderr"
level = "DEBUG"
formatter = "simple"

[sinks.file]
kind = "file"
destination = "logging.log"
level = "DEBUG"
formatter = "simple"

[loggers.""]
sinks = ["file"]
level = "DEBUG"

[loggers.error]
sinks = ["console"]
level = "ERROR"

[loggers."app.member"]
sinks = ["console"]
level = "DEBUG"
"#;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<DispatchSpec, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        debug!(path = %path.display(), ?format, "Loading dispatch config");
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<DispatchSpec, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// The built-in [`DEMO_CONFIG_TOML`] configuration
    pub fn demo() -> Result<DispatchSpec, ContractError> {
        Self::load_from_str(DEMO_CONFIG_TOML, ConfigFormat::Toml)
    }

    /// Serialize DispatchSpec to TOML string
    pub fn to_toml(spec: &DispatchSpec) -> Result<String, ContractError> {
        toml::to_string_pretty(spec)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize DispatchSpec to JSON string
    pub fn to_json(spec: &DispatchSpec) -> Result<String, ContractError> {
        serde_json::to_string_pretty(spec)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<DispatchSpec, ContractError> {
        let spec = parser::parse(content, format)?;
        validator::validate(&spec)?;
        Ok(spec)
    }
}
