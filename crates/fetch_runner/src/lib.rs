//! # Fetch Runner
//!
//! 并发 HTTP 批量请求模块。
//!
//! 负责：
//! - 在单线程 tokio runtime 上同时发起 `count` 个 GET
//! - 每个任务结束时调用一次完成回调
//! - 等待全部任务结束并统计总耗时
//!
//! # Example
//!
//! ```no_run
//! use contracts::BatchConfig;
//!
//! let report = fetch_runner::run_batch(BatchConfig::default()).unwrap();
//! println!("{} tasks in {:?}", report.tasks.len(), report.elapsed);
//! ```

mod http;
mod runner;
mod timing;

pub use contracts::{BatchConfig, FetchError, FetchTask, Fetcher, TaskState};
pub use http::HttpFetcher;
pub use runner::{report_status, run_batch, run_batch_with, BatchReport, FetchRunner};
pub use timing::{measure, measure_async};
