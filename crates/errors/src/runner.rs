//! Task runner error types

use thiserror::Error;

/// Errors reported by the bounded task runner.
///
/// Individual task failures are never surfaced here; the runner only
/// reports how the run as a whole ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RunnerError {
    #[error("number of workers must be positive")]
    NotPositiveWorkers,

    #[error("errors limit exceeded")]
    ErrorsLimitExceeded,
}
