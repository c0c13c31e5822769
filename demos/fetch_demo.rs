//! Fetch Demo
//!
//! Issues 49 concurrent GETs against the default target on a
//! single-threaded runtime, prints each status as it arrives and the total
//! elapsed time at the end.
//!
//! Run with: cargo run -p logfetch_demos --bin fetch_demo

use contracts::BatchConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let report = fetch_runner::run_batch(BatchConfig::default())?;
    println!("Completed: {}, failed: {}", report.completed(), report.failed());

    Ok(())
}
