//! # logfetch CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - `dispatch`: 按配置分发一条日志
//! - `fetch`: 并发批量 GET 并统计耗时
//! - `validate`: 检查分发配置

mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_dispatch, run_fetch, run_validate};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(cli.observability_config())?;

    info!(version = env!("CARGO_PKG_VERSION"), "logfetch starting");

    let result = match &cli.command {
        Commands::Dispatch(args) => run_dispatch(args),
        Commands::Fetch(args) => run_fetch(args),
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
