//! Typed stage composition over channel edges

use std::future::Future;

use tokio::sync::mpsc::{self, Receiver};
use tokio_util::sync::CancellationToken;

use crate::config::PipelineConfig;
use crate::worker;

/// One end of a staged value pipeline.
///
/// A `Pipeline<T>` owns the receiver of the most recently appended
/// stage's output stream. Appending a stage spawns that stage's worker
/// and yields a `Pipeline` of the stage's output type; with no stages
/// appended the pipeline degenerates to identity passthrough and
/// [`into_receiver`](Self::into_receiver) returns the original stream
/// unchanged.
///
/// All stages appended to one pipeline observe the same cancellation
/// token. Firing it is idempotent and terminates the whole chain within
/// one element's processing latency.
pub struct Pipeline<T> {
    rx: Receiver<T>,
    cancel: CancellationToken,
    config: PipelineConfig,
}

impl<T: Send + 'static> Pipeline<T> {
    /// Build a pipeline over an already open stream, without external
    /// cancellation.
    #[must_use]
    pub fn from_receiver(rx: Receiver<T>) -> Self {
        Self::from_receiver_with_cancellation(rx, CancellationToken::new())
    }

    /// Build a pipeline over an already open stream, cancellable through
    /// `cancel`.
    #[must_use]
    pub fn from_receiver_with_cancellation(rx: Receiver<T>, cancel: CancellationToken) -> Self {
        Self {
            rx,
            cancel,
            config: PipelineConfig::default(),
        }
    }

    /// Build a pipeline fed from an in-memory sequence.
    ///
    /// A feeder worker forwards the values into the first edge and closes
    /// it when the sequence is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since the feeder worker
    /// is spawned immediately.
    pub fn from_iter<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::from_iter_with_cancellation(values, CancellationToken::new())
    }

    /// Build a pipeline fed from an in-memory sequence, cancellable
    /// through `cancel`. The feeder stops producing once the token fires.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since the feeder worker
    /// is spawned immediately.
    pub fn from_iter_with_cancellation<I>(values: I, cancel: CancellationToken) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        let config = PipelineConfig::default();
        let (tx, rx) = mpsc::channel(config.edge_capacity());
        tokio::spawn(worker::feeder(values.into_iter(), tx, cancel.clone()));
        Self { rx, cancel, config }
    }

    /// Replace the pipeline configuration for stages appended after this
    /// call.
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the channel capacity for stage edges appended after this call.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// A clone of the pipeline's cancellation token.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Append a synchronous per-element transformation stage.
    ///
    /// The stage runs as its own worker; the element type may change.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn stage<U, F>(self, mut transform: F) -> Pipeline<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        self.then(move |value| std::future::ready(transform(value)))
    }

    /// Append an asynchronous per-element transformation stage.
    ///
    /// The transformation future is awaited to completion for each
    /// element before the result is forwarded, which is what bounds the
    /// pipeline's cancellation latency to one element.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn then<U, F, Fut>(self, transform: F) -> Pipeline<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = U> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.config.edge_capacity());
        tokio::spawn(worker::stage_worker(
            self.rx,
            tx,
            self.cancel.clone(),
            transform,
        ));
        Pipeline {
            rx,
            cancel: self.cancel,
            config: self.config,
        }
    }

    /// Append a custom stream-level stage: a function from the input
    /// stream to a new output stream.
    ///
    /// The stage is free to spawn its own worker and apply arbitrary
    /// stream transformations. A cancellation guard worker is interposed
    /// between the stage's output and the next edge, so the chain stays
    /// promptly cancellable even if the stage itself never looks at the
    /// token. A custom stage must stop once sending on its output fails,
    /// which happens as soon as the guard releases the stream.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn apply<U, S>(self, stage: S) -> Pipeline<U>
    where
        U: Send + 'static,
        S: FnOnce(Receiver<T>) -> Receiver<U>,
    {
        let inner = stage(self.rx);
        let (tx, rx) = mpsc::channel(self.config.edge_capacity());
        tokio::spawn(worker::stage_worker(
            inner,
            tx,
            self.cancel.clone(),
            std::future::ready::<U>,
        ));
        Pipeline {
            rx,
            cancel: self.cancel,
            config: self.config,
        }
    }

    /// Terminate composition and take the output stream.
    #[must_use]
    pub fn into_receiver(self) -> Receiver<T> {
        self.rx
    }

    /// Drain the output stream into a `Vec`.
    ///
    /// Returns once the stream closes, whether by input exhaustion or by
    /// cancellation.
    pub async fn collect(self) -> Vec<T> {
        let mut rx = self.rx;
        let mut values = Vec::new();
        while let Some(value) = rx.recv().await {
            values.push(value);
        }
        values
    }
}
