//! Timing combinators

use std::future::Future;
use std::time::{Duration, Instant};

/// Run `op` and return its result with the wall-clock time it took
pub fn measure<T>(op: impl FnOnce() -> T) -> (T, Duration) {
    let started = Instant::now();
    let value = op();
    (value, started.elapsed())
}

/// Await `fut` and return its output with the wall-clock time it took.
///
/// The clock starts on first poll.
pub async fn measure_async<F: Future>(fut: F) -> (F::Output, Duration) {
    let started = Instant::now();
    let value = fut.await;
    (value, started.elapsed())
}
