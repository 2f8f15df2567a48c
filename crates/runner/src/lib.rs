#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Bounded task runner with an error budget
//!
//! This crate executes a finite list of fallible jobs across a fixed pool
//! of concurrent workers. Workers share a single dispatch queue and a
//! single atomic failure counter; once the counter reaches the configured
//! limit, no further task is started and the run ends with
//! [`RunnerError::ErrorsLimitExceeded`]. Tasks that are already in flight
//! when the budget is exhausted run to completion.
//!
//! Task failure detail is discarded by design - only the aggregate count
//! is consulted, never the individual errors.
//!
//! ```
//! use conveyor_runner::{run, task};
//!
//! # async fn demo() -> Result<(), conveyor_errors::RunnerError> {
//! let tasks = (0..8).map(|_| task(async { Ok::<(), ()>(()) }));
//! run(tasks, 4, 1).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam::queue::SegQueue;
use futures::future::BoxFuture;
use tokio::task::JoinSet;

use conveyor_errors::RunnerError;

mod worker;

/// A single fallible unit of work.
///
/// The error value is never inspected beyond `is_err()`; callers pick
/// whatever error type suits the job.
pub type Task<E> = BoxFuture<'static, Result<(), E>>;

/// Box a future into a [`Task`].
pub fn task<E, F>(fut: F) -> Task<E>
where
    F: std::future::Future<Output = Result<(), E>> + Send + 'static,
{
    Box::pin(fut)
}

/// Run `tasks` on `worker_count` concurrent workers, aborting dispatch
/// once `error_limit` task failures have been observed.
///
/// Tasks are dispatched in list order, but workers race for the queue, so
/// completion order across workers is unspecified. The call returns only
/// after every worker has terminated; no background work outlives it.
///
/// # Errors
///
/// Returns [`RunnerError::NotPositiveWorkers`] if `worker_count` is zero,
/// and [`RunnerError::ErrorsLimitExceeded`] if `error_limit` is zero or
/// the failure counter reached `error_limit` at any point during the run.
/// Both validation failures are reported before any worker is spawned or
/// any task is polled.
pub async fn run<E, I>(tasks: I, worker_count: usize, error_limit: usize) -> Result<(), RunnerError>
where
    I: IntoIterator<Item = Task<E>>,
    E: Send + 'static,
{
    if worker_count == 0 {
        return Err(RunnerError::NotPositiveWorkers);
    }
    if error_limit == 0 {
        return Err(RunnerError::ErrorsLimitExceeded);
    }

    let queue = Arc::new(SegQueue::new());
    for t in tasks {
        queue.push(t);
    }
    let failures = Arc::new(AtomicUsize::new(0));

    tracing::debug!(
        workers = worker_count,
        error_limit,
        queued = queue.len(),
        "starting task run"
    );

    let mut workers = JoinSet::new();
    for id in 0..worker_count {
        workers.spawn(worker::worker_loop(
            id,
            Arc::clone(&queue),
            Arc::clone(&failures),
            error_limit,
        ));
    }

    while let Some(joined) = workers.join_next().await {
        if joined.is_err() {
            // A task panicked through its worker. The panic is not ours to
            // swallow silently, but the remaining workers still drain the
            // queue and the aggregate contract holds.
            tracing::warn!("worker terminated abnormally");
        }
    }

    if failures.load(Ordering::Acquire) >= error_limit {
        return Err(RunnerError::ErrorsLimitExceeded);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_zero_workers_before_spawning() {
        let tasks = vec![task(async { Ok::<(), ()>(()) })];
        let result = run(tasks, 0, 5).await;
        assert_eq!(result, Err(RunnerError::NotPositiveWorkers));
    }

    #[tokio::test]
    async fn rejects_zero_error_limit_before_spawning() {
        let tasks = vec![task(async { Ok::<(), ()>(()) })];
        let result = run(tasks, 5, 0).await;
        assert_eq!(result, Err(RunnerError::ErrorsLimitExceeded));
    }

    #[tokio::test]
    async fn empty_task_list_succeeds() {
        let tasks: Vec<Task<()>> = Vec::new();
        assert_eq!(run(tasks, 3, 1).await, Ok(()));
    }
}
