//! FetchRunner - one batch of concurrent GETs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{BatchConfig, FetchError, FetchTask, Fetcher, TaskState};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::http::HttpFetcher;
use crate::timing::measure_async;

/// Outcome of [`run_batch`]
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Every task, settled, sorted by id
    pub tasks: Vec<FetchTask>,
    /// Wall-clock time from first launch to last settle
    pub elapsed: Duration,
}

impl BatchReport {
    /// Tasks that received a status code
    pub fn completed(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(t.state, TaskState::Completed(_)))
            .count()
    }

    /// Tasks that failed at the transport level or panicked
    pub fn failed(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(t.state, TaskState::Failed(_)))
            .count()
    }
}

/// Default completion handler: prints one line per task.
///
/// # Errors
/// Returns the task's own failure so the runner can log it.
pub fn report_status(task: &FetchTask) -> Result<(), FetchError> {
    let status = task.result()?;
    println!("Task {} status: {}", task.id, status);
    Ok(())
}

/// Schedules a batch of fetches on the current tokio runtime
pub struct FetchRunner<F> {
    fetcher: Arc<F>,
    config: BatchConfig,
}

impl<F> FetchRunner<F>
where
    F: Fetcher + Sync + 'static,
{
    pub fn new(fetcher: Arc<F>, config: BatchConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Launch every task, then drive them to completion.
    ///
    /// Tasks are spawned in ascending id order. `handler` is called exactly
    /// once per task, in completion order; its errors are logged and do not
    /// affect other tasks. Returns all tasks sorted by id.
    #[instrument(
        name = "fetch_runner_run",
        skip(self, handler),
        fields(count = self.config.count, target = %self.config.target)
    )]
    pub async fn run<H>(&self, mut handler: H) -> Vec<FetchTask>
    where
        H: FnMut(&FetchTask) -> Result<(), FetchError>,
    {
        let count = self.config.count;
        let mut tasks: Vec<FetchTask> = (0..count).map(FetchTask::new).collect();
        let mut launched_at = Vec::with_capacity(count);
        let mut ids = HashMap::with_capacity(count);
        let mut set = JoinSet::new();

        for task in &mut tasks {
            let fetcher = Arc::clone(&self.fetcher);
            let url = self.config.target.clone();
            let task_id = task.id;

            let handle =
                set.spawn(async move { measure_async(fetcher.fetch(task_id, &url)).await });
            ids.insert(handle.id(), task_id);
            launched_at.push(Instant::now());
            task.state = TaskState::Running;
        }
        debug!(launched = count, "All tasks launched");

        while let Some(joined) = set.join_next_with_id().await {
            let runtime_id = match &joined {
                Ok((runtime_id, _)) => *runtime_id,
                Err(join_err) => join_err.id(),
            };
            let Some(task_id) = ids.remove(&runtime_id) else {
                error!(?runtime_id, "Joined a task that was never launched");
                continue;
            };

            let (outcome, latency) = match joined {
                Ok((_, (outcome, latency))) => (outcome, latency),
                Err(join_err) => (
                    Err(FetchError::Join {
                        task_id,
                        message: join_err.to_string(),
                    }),
                    launched_at[task_id].elapsed(),
                ),
            };

            let task = &mut tasks[task_id];
            task.settle(outcome, latency);

            match &task.state {
                TaskState::Failed(e) => warn!(task_id, error = %e, "Task failed"),
                _ => debug!(task_id, latency_ms = latency.as_millis() as u64, "Task completed"),
            }
            observability::record_fetch_settled(task);

            if let Err(e) = handler(&*task) {
                warn!(task_id, error = %e, "Completion handler failed");
            }
        }

        tasks
    }
}

/// Run one batch with [`report_status`] on a fresh single-threaded runtime.
///
/// # Errors
/// Returns `FetchError::Runtime` if the runtime or HTTP client cannot be
/// built. Individual task failures are reported in the returned tasks.
pub fn run_batch(config: BatchConfig) -> Result<BatchReport, FetchError> {
    run_batch_with(config, report_status)
}

/// [`run_batch`] with a caller-supplied completion handler.
///
/// Must not be called from inside a tokio runtime.
#[instrument(
    name = "fetch_run_batch",
    skip(config, handler),
    fields(count = config.count, target = %config.target)
)]
pub fn run_batch_with<H>(config: BatchConfig, handler: H) -> Result<BatchReport, FetchError>
where
    H: FnMut(&FetchTask) -> Result<(), FetchError>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| FetchError::runtime(format!("failed to build runtime: {e}")))?;

    let fetcher = Arc::new(HttpFetcher::new()?);
    let runner = FetchRunner::new(fetcher, config);
    let (tasks, elapsed) = runtime.block_on(measure_async(runner.run(handler)));
    drop(runner);

    observability::record_batch_duration(elapsed);
    let report = BatchReport { tasks, elapsed };
    info!(
        completed = report.completed(),
        failed = report.failed(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Batch finished"
    );
    println!("Total execution time: {:.3}s", elapsed.as_secs_f64());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Sleeps, then answers 200 unless the task id is listed as failing
    struct FakeFetcher {
        delay: Duration,
        failing: HashSet<usize>,
        panicking: HashSet<usize>,
    }

    impl FakeFetcher {
        fn new(delay_ms: u64) -> Self {
            Self {
                delay: Duration::from_millis(delay_ms),
                failing: HashSet::new(),
                panicking: HashSet::new(),
            }
        }
    }

    impl Fetcher for FakeFetcher {
        async fn fetch(&self, task_id: usize, url: &str) -> Result<u16, FetchError> {
            tokio::time::sleep(self.delay).await;
            if self.panicking.contains(&task_id) {
                panic!("fetcher blew up on task {task_id}");
            }
            if self.failing.contains(&task_id) {
                return Err(FetchError::transport(task_id, url, "connection reset"));
            }
            Ok(200)
        }
    }

    #[tokio::test]
    async fn test_run_settles_all_tasks() {
        let runner = FetchRunner::new(Arc::new(FakeFetcher::new(10)), BatchConfig::new(5, "fake://"));
        let mut seen = Vec::new();

        let tasks = runner
            .run(|task| {
                seen.push(task.id);
                Ok(())
            })
            .await;

        assert_eq!(tasks.len(), 5);
        assert!(tasks.iter().all(|t| t.state == TaskState::Completed(200)));
        assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert!(tasks.iter().all(|t| t.latency.is_some()));

        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_run_is_concurrent() {
        let runner =
            FetchRunner::new(Arc::new(FakeFetcher::new(100)), BatchConfig::new(49, "fake://"));

        let (tasks, elapsed) = measure_async(runner.run(|_| Ok(()))).await;
        assert_eq!(tasks.len(), 49);
        assert!(elapsed < Duration::from_millis(100 * 49 / 4), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_transport_failure_is_isolated() {
        let mut fetcher = FakeFetcher::new(5);
        fetcher.failing.insert(3);
        let runner = FetchRunner::new(Arc::new(fetcher), BatchConfig::new(6, "fake://"));

        let mut ok = 0;
        let mut failed = Vec::new();
        let tasks = runner
            .run(|task| {
                match task.result() {
                    Ok(_) => ok += 1,
                    Err(e) => failed.push(e),
                }
                Ok(())
            })
            .await;

        assert_eq!(ok, 5);
        assert_eq!(failed.len(), 1);
        assert!(matches!(failed[0], FetchError::Transport { task_id: 3, .. }));
        assert!(matches!(tasks[3].state, TaskState::Failed(_)));
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_join_error() {
        let mut fetcher = FakeFetcher::new(1);
        fetcher.panicking.insert(1);
        let runner = FetchRunner::new(Arc::new(fetcher), BatchConfig::new(3, "fake://"));

        let tasks = runner.run(|_| Ok(())).await;
        assert!(matches!(
            tasks[1].result(),
            Err(FetchError::Join { task_id: 1, .. })
        ));
        assert_eq!(tasks[0].state, TaskState::Completed(200));
        assert_eq!(tasks[2].state, TaskState::Completed(200));
    }

    #[tokio::test]
    async fn test_handler_error_does_not_stop_batch() {
        let runner = FetchRunner::new(Arc::new(FakeFetcher::new(1)), BatchConfig::new(4, "fake://"));
        let mut calls = 0;

        let tasks = runner
            .run(|task| {
                calls += 1;
                if task.id == 0 {
                    Err(FetchError::runtime("handler rejected task 0"))
                } else {
                    Ok(())
                }
            })
            .await;

        assert_eq!(calls, 4);
        assert!(tasks.iter().all(|t| t.state.is_settled()));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let runner = FetchRunner::new(Arc::new(FakeFetcher::new(1)), BatchConfig::new(0, "fake://"));
        let tasks = runner.run(|_| panic!("handler must not run")).await;
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_http_fetcher_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
            .expect(49)
            .mount(&server)
            .await;

        let fetcher = Arc::new(HttpFetcher::new().unwrap());
        let runner = FetchRunner::new(fetcher, BatchConfig::new(49, server.uri()));
        let mut calls = 0;

        let (tasks, elapsed) = measure_async(runner.run(|task| {
            calls += 1;
            assert_eq!(task.result().unwrap(), 200);
            Ok(())
        }))
        .await;

        assert_eq!(calls, 49);
        assert_eq!(tasks.len(), 49);
        assert!(elapsed < Duration::from_millis(200 * 49 / 4), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_non_success_status_is_completed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let runner = FetchRunner::new(
            Arc::new(HttpFetcher::new().unwrap()),
            BatchConfig::new(2, server.uri()),
        );
        let tasks = runner.run(report_status).await;
        assert!(tasks.iter().all(|t| t.state == TaskState::Completed(404)));
    }

    #[test]
    fn test_run_batch_unreachable_target() {
        let mut calls = 0;
        let report = run_batch_with(BatchConfig::new(3, "http://127.0.0.1:1/"), |task| {
            calls += 1;
            assert!(matches!(task.result(), Err(FetchError::Transport { .. })));
            Ok(())
        })
        .unwrap();

        assert_eq!(calls, 3);
        assert_eq!(report.failed(), 3);
        assert_eq!(report.completed(), 0);
    }

    #[test]
    fn test_report_status_propagates_failure() {
        let mut task = FetchTask::new(9);
        assert!(matches!(
            report_status(&task),
            Err(FetchError::NotSettled { task_id: 9 })
        ));

        task.settle(Ok(200), Duration::from_millis(1));
        assert!(report_status(&task).is_ok());
    }
}
