//! `dispatch` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::DispatchSpec;
use dispatcher::DispatchRegistry;
use tracing::{debug, info};

use crate::cli::DispatchArgs;
use crate::error::{self, CliError};

/// Execute the `dispatch` command
pub fn run_dispatch(args: &DispatchArgs) -> Result<()> {
    let spec = load_spec(args.config.as_deref())?;

    let mut registry = DispatchRegistry::configure(&spec)
        .map_err(CliError::from)
        .context("Failed to configure dispatch registry")?;

    let logger = registry.get_logger(&args.logger);
    info!(
        logger = %args.logger,
        matched = %logger.matched_name(),
        level = %args.level,
        "Emitting record"
    );

    let written = registry
        .emit(&logger, args.level, args.message.as_str())
        .map_err(CliError::from)?;
    registry.flush().map_err(CliError::from)?;
    debug!(written, "Record dispatched");

    for (sink, snapshot) in registry.metrics() {
        observability::record_sink_snapshot(&sink, snapshot.write_count, snapshot.failure_count);
    }

    Ok(())
}

fn load_spec(path: Option<&Path>) -> error::Result<DispatchSpec> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()));
            }
            info!(config = %path.display(), "Loading dispatch configuration");
            Ok(ConfigLoader::load_from_path(path)?)
        }
        None => {
            debug!("No config given, using built-in demo configuration");
            Ok(ConfigLoader::demo()?)
        }
    }
}
