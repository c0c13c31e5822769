//! Severity - ordinal log level
//!
//! Loggers and sinks both carry a minimum severity; a record passes a
//! threshold when `record.severity >= threshold`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ContractError;

/// Log severity, ordered from least to most severe.
///
/// Numeric values follow the conventional 10-step scale so configuration
/// files may use either names or numbers.
///
/// # Examples
/// ```
/// use contracts::Severity;
///
/// let level: Severity = "warn".parse().unwrap();
/// assert_eq!(level, Severity::Warning);
/// assert!(Severity::Error >= level);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "SeverityRepr", into = "String")]
pub enum Severity {
    /// Accepts everything
    #[default]
    NotSet = 0,
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl Severity {
    /// All levels in ascending order
    pub const ALL: [Severity; 6] = [
        Severity::NotSet,
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Upper-case level name, as rendered by formatters
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotSet => "NOTSET",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Numeric value of the level
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Look a level up by its numeric value
    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.value() == value)
    }

    /// Whether a record at `self` passes a `threshold`
    #[inline]
    pub fn passes(&self, threshold: Severity) -> bool {
        *self >= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<u8>() {
            return Self::from_value(value).ok_or_else(|| {
                ContractError::config_validation("level", format!("unknown level value {value}"))
            });
        }

        match trimmed.to_ascii_uppercase().as_str() {
            "NOTSET" => Ok(Self::NotSet),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(ContractError::config_validation(
                "level",
                format!("unknown level '{trimmed}'"),
            )),
        }
    }
}

/// Wire representation: either a level name or its numeric value
#[derive(Deserialize)]
#[serde(untagged)]
enum SeverityRepr {
    Name(String),
    Value(u8),
}

impl TryFrom<SeverityRepr> for Severity {
    type Error = ContractError;

    fn try_from(repr: SeverityRepr) -> Result<Self, ContractError> {
        match repr {
            SeverityRepr::Name(name) => name.parse(),
            SeverityRepr::Value(value) => Self::from_value(value).ok_or_else(|| {
                ContractError::config_validation("level", format!("unknown level value {value}"))
            }),
        }
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}
