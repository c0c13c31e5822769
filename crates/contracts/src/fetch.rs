//! Fetch contracts - task model and fetcher interface
//!
//! A batch is a fixed set of `FetchTask`s; each wraps one GET against the
//! same target and settles exactly once.

use std::time::Duration;

use crate::FetchError;

/// Default number of tasks in a batch
pub const DEFAULT_TASK_COUNT: usize = 49;

/// Default fetch target
pub const DEFAULT_TARGET: &str = "https://www.baidu.com";

/// Batch parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of tasks to launch
    pub count: usize,
    /// URL every task fetches
    pub target: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_TASK_COUNT,
            target: DEFAULT_TARGET.to_string(),
        }
    }
}

impl BatchConfig {
    pub fn new(count: usize, target: impl Into<String>) -> Self {
        Self {
            count,
            target: target.into(),
        }
    }
}

/// Lifecycle of a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Created, not yet scheduled
    Pending,
    /// Scheduled on the runtime
    Running,
    /// Response received; carries the HTTP status code
    Completed(u16),
    /// Transport-level failure
    Failed(FetchError),
}

impl TaskState {
    /// Completed or failed
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }
}

/// One in-flight network request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    /// Ordinal in launch order, `0..count`
    pub id: usize,
    /// Current state
    pub state: TaskState,
    /// Time from spawn to settle
    pub latency: Option<Duration>,
}

impl FetchTask {
    /// New pending task
    pub fn new(id: usize) -> Self {
        Self {
            id,
            state: TaskState::Pending,
            latency: None,
        }
    }

    /// Extract the status code.
    ///
    /// # Errors
    /// Returns the original transport failure for a failed task, or
    /// `FetchError::NotSettled` if the task has not finished yet.
    pub fn result(&self) -> Result<u16, FetchError> {
        match &self.state {
            TaskState::Completed(status) => Ok(*status),
            TaskState::Failed(err) => Err(err.clone()),
            TaskState::Pending | TaskState::Running => {
                Err(FetchError::NotSettled { task_id: self.id })
            }
        }
    }

    /// Record the outcome of the fetch
    pub fn settle(&mut self, outcome: Result<u16, FetchError>, latency: Duration) {
        self.state = match outcome {
            Ok(status) => TaskState::Completed(status),
            Err(err) => TaskState::Failed(err),
        };
        self.latency = Some(latency);
    }
}

/// Performs one GET and reports the status code.
///
/// Non-2xx statuses are successful results; only transport failures are
/// errors.
#[trait_variant::make(Fetcher: Send)]
pub trait LocalFetcher {
    /// Fetch `url` on behalf of task `task_id`
    async fn fetch(&self, task_id: usize, url: &str) -> Result<u16, FetchError>;
}
