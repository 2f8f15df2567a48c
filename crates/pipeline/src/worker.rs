//! Stage and feeder worker loops
//!
//! Every worker here follows the same discipline: each suspension point
//! (receiving the next element, forwarding a transformed one) is a
//! `select!` race against the shared cancellation token, with the token
//! checked first. Once the token has fired a worker never forwards
//! another value. Dropping the output sender on exit closes the stream
//! for the next stage, which is the only end-of-stream signal used.

use std::future::Future;

use tokio::sync::mpsc::{Receiver, Sender};
use tokio_util::sync::CancellationToken;

/// Single-stage worker: receive, transform, forward, in arrival order.
pub(crate) async fn stage_worker<T, U, F, Fut>(
    mut input: Receiver<T>,
    output: Sender<U>,
    cancel: CancellationToken,
    mut transform: F,
) where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = U>,
{
    loop {
        let value = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::trace!("stage cancelled while waiting for input");
                break;
            }
            received = input.recv() => match received {
                Some(value) => value,
                None => break,
            },
        };
        // The transformation itself is not raced against cancellation:
        // an in-flight element may finish processing, which bounds the
        // reaction latency to one element.
        let transformed = transform(value).await;
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::trace!("stage cancelled while forwarding");
                break;
            }
            sent = output.send(transformed) => {
                if sent.is_err() {
                    // Downstream released its receiver.
                    break;
                }
            }
        }
    }
}

/// Feed an in-memory sequence into the first stage edge.
pub(crate) async fn feeder<T, I>(values: I, output: Sender<T>, cancel: CancellationToken)
where
    I: Iterator<Item = T>,
{
    for value in values {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            sent = output.send(value) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
}
