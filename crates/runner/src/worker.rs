//! Worker loop for the bounded task runner

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam::queue::SegQueue;

use crate::Task;

/// Pull tasks from the shared queue until it is drained or the error
/// budget is exhausted.
///
/// The counter is checked before every pop, so no task begins execution
/// once the threshold has been observed crossed. Failures are recorded
/// with a single `fetch_add`, which rules out both lost updates and
/// double counting under concurrent workers.
pub(crate) async fn worker_loop<E>(
    id: usize,
    queue: Arc<SegQueue<Task<E>>>,
    failures: Arc<AtomicUsize>,
    error_limit: usize,
) where
    E: Send + 'static,
{
    loop {
        if failures.load(Ordering::Acquire) >= error_limit {
            tracing::debug!(worker = id, "error budget exhausted, stopping");
            break;
        }
        let Some(task) = queue.pop() else {
            tracing::trace!(worker = id, "queue drained");
            break;
        };
        if task.await.is_err() {
            let seen = failures.fetch_add(1, Ordering::AcqRel) + 1;
            tracing::debug!(worker = id, failures = seen, "task failed");
        }
    }
}
