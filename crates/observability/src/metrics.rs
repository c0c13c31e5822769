//! 指标收集模块
//!
//! Prometheus 指标记录 + 内存中的批次统计。

use std::collections::BTreeMap;
use std::time::Duration;

use contracts::{FetchTask, TaskState};
use metrics::{counter, histogram};

/// 记录一个已结束的 fetch 任务
///
/// 每个任务 settle 后调用一次。Pending/Running 任务被忽略。
pub fn record_fetch_settled(task: &FetchTask) {
    match &task.state {
        TaskState::Completed(status) => {
            counter!(
                "logfetch_fetch_completed_total",
                "status" => status.to_string()
            )
            .increment(1);
        }
        TaskState::Failed(_) => {
            counter!("logfetch_fetch_failed_total").increment(1);
        }
        TaskState::Pending | TaskState::Running => return,
    }

    if let Some(latency) = task.latency {
        histogram!("logfetch_fetch_latency_ms").record(latency.as_secs_f64() * 1000.0);
    }
}

/// 记录整个批次的耗时
pub fn record_batch_duration(elapsed: Duration) {
    histogram!("logfetch_batch_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
}

/// 记录 sink 写出统计 (累计值)
pub fn record_sink_snapshot(sink_name: &str, written: u64, failures: u64) {
    counter!(
        "logfetch_records_emitted_total",
        "sink" => sink_name.to_string()
    )
    .absolute(written);
    counter!(
        "logfetch_sink_failures_total",
        "sink" => sink_name.to_string()
    )
    .absolute(failures);
}

/// 批次指标聚合器
///
/// 在内存中聚合任务结果，便于输出摘要。
#[derive(Debug, Clone, Default)]
pub struct FetchMetricsAggregator {
    /// 成功拿到状态码的任务数
    pub completed: u64,

    /// 传输失败的任务数
    pub failed: u64,

    /// 各状态码出现次数
    pub status_counts: BTreeMap<u16, u64>,

    /// 单任务延迟统计 (毫秒)
    pub latency_ms: RunningStats,
}

impl FetchMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 从一组任务构建
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a FetchTask>) -> Self {
        let mut aggregator = Self::new();
        for task in tasks {
            aggregator.update(task);
        }
        aggregator
    }

    /// 更新聚合统计
    pub fn update(&mut self, task: &FetchTask) {
        match &task.state {
            TaskState::Completed(status) => {
                self.completed += 1;
                *self.status_counts.entry(*status).or_insert(0) += 1;
            }
            TaskState::Failed(_) => self.failed += 1,
            TaskState::Pending | TaskState::Running => return,
        }

        if let Some(latency) = task.latency {
            self.latency_ms.push(latency.as_secs_f64() * 1000.0);
        }
    }

    /// 生成摘要报告
    pub fn summary(&self, elapsed: Duration) -> FetchSummary {
        FetchSummary {
            completed: self.completed,
            failed: self.failed,
            status_counts: self.status_counts.clone(),
            latency_ms: StatsSummary::from(&self.latency_ms),
            elapsed,
        }
    }
}

/// 批次摘要
#[derive(Debug, Clone, Default)]
pub struct FetchSummary {
    pub completed: u64,
    pub failed: u64,
    pub status_counts: BTreeMap<u16, u64>,
    pub latency_ms: StatsSummary,
    pub elapsed: Duration,
}

impl FetchSummary {
    pub fn total(&self) -> u64 {
        self.completed + self.failed
    }
}

impl std::fmt::Display for FetchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Fetch Batch Summary ===")?;
        writeln!(f, "Tasks: {}", self.total())?;
        writeln!(f, "Completed: {}", self.completed)?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;
        writeln!(f, "Elapsed: {:.3}s", self.elapsed.as_secs_f64())?;

        if !self.status_counts.is_empty() {
            writeln!(f, "Status codes:")?;
            for (status, count) in &self.status_counts {
                writeln!(f, "  {}: {}", status, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1} (n={})",
                self.min, self.max, self.mean, self.count
            )
        }
    }
}

/// 在线统计 (count/min/max/mean)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
            self.mean += (value - self.mean) / self.count as f64;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::FetchError;

    fn settled(id: usize, outcome: Result<u16, FetchError>, ms: u64) -> FetchTask {
        let mut task = FetchTask::new(id);
        task.settle(outcome, Duration::from_millis(ms));
        task
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_counts_outcomes() {
        let tasks = vec![
            settled(0, Ok(200), 10),
            settled(1, Ok(404), 30),
            settled(2, Err(FetchError::transport(2, "http://x", "refused")), 5),
            FetchTask::new(3),
        ];

        let aggregator = FetchMetricsAggregator::from_tasks(&tasks);
        assert_eq!(aggregator.completed, 2);
        assert_eq!(aggregator.failed, 1);
        assert_eq!(aggregator.status_counts.get(&200), Some(&1));
        assert_eq!(aggregator.status_counts.get(&404), Some(&1));
        assert_eq!(aggregator.latency_ms.count(), 3);
    }

    #[test]
    fn test_summary_display() {
        let tasks = vec![settled(0, Ok(200), 20), settled(1, Ok(200), 40)];
        let summary =
            FetchMetricsAggregator::from_tasks(&tasks).summary(Duration::from_millis(45));

        let output = format!("{}", summary);
        assert!(output.contains("Tasks: 2"));
        assert!(output.contains("200: 2"));
        assert!(output.contains("mean=30.0"));
        assert!(output.contains("Elapsed: 0.045s"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_fetch_settled(&settled(0, Ok(200), 1));
        record_batch_duration(Duration::from_millis(1));
        record_sink_snapshot("console", 3, 0);
    }
}
