//! Integration tests for the bounded task runner

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout, Instant};

use conveyor_errors::RunnerError;
use conveyor_runner::{run, task, Task};

/// Varied but deterministic per-task duration in milliseconds.
fn task_millis(i: usize) -> u64 {
    (i as u64 * 7) % 100 + 1
}

#[tokio::test(start_paused = true)]
async fn failing_tasks_stop_dispatch_within_budget() {
    let tasks_count = 50;
    let workers_count = 10;
    let max_errors_count = 23;

    let started = Arc::new(AtomicUsize::new(0));
    let tasks: Vec<Task<&str>> = (0..tasks_count)
        .map(|i| {
            let started = Arc::clone(&started);
            task(async move {
                started.fetch_add(1, Ordering::SeqCst);
                sleep(Duration::from_millis(task_millis(i))).await;
                Err("task failed")
            })
        })
        .collect();

    let result = run(tasks, workers_count, max_errors_count).await;

    assert_eq!(result, Err(RunnerError::ErrorsLimitExceeded));
    assert!(
        started.load(Ordering::SeqCst) <= workers_count + max_errors_count,
        "extra tasks were started"
    );
}

#[tokio::test(start_paused = true)]
async fn tasks_without_errors_all_run_concurrently() {
    let tasks_count = 50;
    let workers_count = 5;

    let ran = Arc::new(AtomicUsize::new(0));
    let mut sum_time = Duration::ZERO;
    let tasks: Vec<Task<&str>> = (0..tasks_count)
        .map(|i| {
            let task_sleep = Duration::from_millis(task_millis(i));
            sum_time += task_sleep;
            let ran = Arc::clone(&ran);
            task(async move {
                sleep(task_sleep).await;
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
        .collect();

    let start = Instant::now();
    let result = run(tasks, workers_count, 1).await;
    let elapsed = start.elapsed();

    assert_eq!(result, Ok(()));
    assert_eq!(
        ran.load(Ordering::SeqCst),
        tasks_count,
        "not all tasks were completed"
    );
    assert!(elapsed <= sum_time / 2, "tasks were run sequentially?");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fewer_tasks_than_workers_completes_cleanly() {
    let ran = Arc::new(AtomicUsize::new(0));
    let tasks: Vec<Task<&str>> = (0..4)
        .map(|_| {
            let ran = Arc::clone(&ran);
            task(async move {
                sleep(Duration::from_millis(10)).await;
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
        .collect();

    let result = timeout(Duration::from_secs(5), run(tasks, 5, 1))
        .await
        .expect("runner hung with idle workers");

    assert_eq!(result, Ok(()));
    assert_eq!(ran.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn zero_error_limit_fails_without_running_tasks() {
    let ran = Arc::new(AtomicUsize::new(0));
    let tasks: Vec<Task<&str>> = (0..40)
        .map(|_| {
            let ran = Arc::clone(&ran);
            task(async move {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
        .collect();

    let result = run(tasks, 5, 0).await;

    assert_eq!(result, Err(RunnerError::ErrorsLimitExceeded));
    assert_eq!(ran.load(Ordering::SeqCst), 0, "tasks ran despite zero budget");
}

#[tokio::test]
async fn zero_workers_fails_without_running_tasks() {
    let ran = Arc::new(AtomicUsize::new(0));
    let tasks: Vec<Task<&str>> = (0..40)
        .map(|_| {
            let ran = Arc::clone(&ran);
            task(async move {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
        .collect();

    let result = run(tasks, 0, 5).await;

    assert_eq!(result, Err(RunnerError::NotPositiveWorkers));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn failures_below_the_limit_still_succeed() {
    let tasks: Vec<Task<&str>> = (0..10)
        .map(|i| {
            task(async move {
                sleep(Duration::from_millis(task_millis(i))).await;
                if i % 4 == 0 {
                    Err("task failed")
                } else {
                    Ok(())
                }
            })
        })
        .collect();

    // 3 failures out of 10 tasks, budget of 5: the run completes.
    assert_eq!(run(tasks, 3, 5).await, Ok(()));
}
