//! Dispatch Demo
//!
//! Builds the dispatch table in code and emits one WARNING through
//! `app.member.xx`: one line on stderr (via `app.member`) and one line
//! appended to `logging.log` (via root).
//!
//! Run with: cargo run -p logfetch_demos --bin dispatch_demo

use contracts::{DispatchSpec, FormatterSpec, LoggerSpec, Severity, SinkSpec};
use dispatcher::DispatchRegistry;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let spec = DispatchSpec::new()
        .formatter(
            "simple",
            FormatterSpec::new("%(asctime)s - %(name)s - %(levelname)s - %(message)s"),
        )
        .sink(
            "console",
            SinkSpec::console()
                .with_level(Severity::Debug)
                .with_formatter("simple"),
        )
        .sink(
            "file",
            SinkSpec::file("logging.log")
                .with_level(Severity::Debug)
                .with_formatter("simple"),
        )
        .logger("", LoggerSpec::new(["file"], Severity::Debug))
        .logger("error", LoggerSpec::new(["console"], Severity::Error))
        .logger("app.member", LoggerSpec::new(["console"], Severity::Debug));

    let mut registry = DispatchRegistry::configure(&spec)?;

    let logger = registry.get_logger("app.member.xx");
    registry.warning(&logger, "member")?;
    registry.flush()?;

    Ok(())
}
