//! `validate` command implementation.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use contracts::{DispatchSpec, SinkKind};
use dispatcher::DispatchRegistry;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: u32,
    formatter_count: usize,
    sink_count: usize,
    file_sinks: Vec<String>,
    loggers: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return invalid(config_path, format!("File not found: {}", args.config.display()));
    }

    let spec = match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(spec) => spec,
        Err(e) => return invalid(config_path, e.to_string()),
    };

    // Referential checks; configure does no I/O
    if let Err(e) = DispatchRegistry::configure(&spec) {
        return invalid(config_path, e.to_string());
    }

    let warnings = collect_warnings(&spec);
    ValidationResult {
        valid: true,
        config_path,
        error: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(summarize(&spec)),
    }
}

fn invalid(config_path: String, error: String) -> ValidationResult {
    ValidationResult {
        valid: false,
        config_path,
        error: Some(error),
        warnings: None,
        summary: None,
    }
}

fn summarize(spec: &DispatchSpec) -> ConfigSummary {
    let mut loggers: Vec<String> = spec
        .named_loggers()
        .map(|(name, _)| name.clone())
        .collect();
    if matches!(spec.root_logger(), Ok(Some(_))) {
        loggers.insert(0, "<root>".to_string());
    }

    ConfigSummary {
        version: spec.version.into(),
        formatter_count: spec.formatters.len(),
        sink_count: spec.sinks.len(),
        file_sinks: spec
            .sinks
            .iter()
            .filter(|(_, sink)| sink.kind == SinkKind::File)
            .filter_map(|(_, sink)| sink.destination.clone())
            .collect(),
        loggers,
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(spec: &DispatchSpec) -> Vec<String> {
    let mut warnings = Vec::new();

    if matches!(spec.root_logger(), Ok(None)) {
        warnings.push(
            "No root logger declared - unmatched names fall back to an empty WARNING root"
                .to_string(),
        );
    }

    let referenced_sinks: BTreeSet<&str> = spec
        .loggers
        .values()
        .chain(spec.root.iter())
        .flat_map(|logger| logger.sinks.iter().map(String::as_str))
        .collect();
    for name in spec.sinks.keys() {
        if !referenced_sinks.contains(name.as_str()) {
            warnings.push(format!("Sink '{}' is not attached to any logger", name));
        }
    }

    let referenced_formatters: BTreeSet<&str> = spec
        .sinks
        .values()
        .filter_map(|sink| sink.formatter.as_deref())
        .collect();
    for name in spec.formatters.keys() {
        if !referenced_formatters.contains(name.as_str()) {
            warnings.push(format!("Formatter '{}' is not used by any sink", name));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Formatters: {}", summary.formatter_count);
            println!("  Sinks: {}", summary.sink_count);
            if !summary.file_sinks.is_empty() {
                println!("  Files: {}", summary.file_sinks.join(", "));
            }
            println!("  Loggers: {}", summary.loggers.join(", "));
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
