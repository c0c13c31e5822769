//! `fetch` command implementation.

use anyhow::{Context, Result};
use contracts::BatchConfig;
use observability::FetchMetricsAggregator;
use tracing::info;

use crate::cli::FetchArgs;
use crate::error::CliError;

/// Execute the `fetch` command
pub fn run_fetch(args: &FetchArgs) -> Result<()> {
    let config = BatchConfig::new(args.count, args.url.as_str());
    info!(count = config.count, url = %config.target, "Starting fetch batch");

    let report = fetch_runner::run_batch(config)
        .map_err(CliError::from)
        .context("Fetch batch could not start")?;

    if args.summary {
        let summary = FetchMetricsAggregator::from_tasks(&report.tasks).summary(report.elapsed);
        println!("\n{summary}");
    }

    Ok(())
}
