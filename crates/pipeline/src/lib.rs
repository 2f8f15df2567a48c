#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Cancellable staged value pipeline
//!
//! This crate composes a left-to-right chain of stream-transformation
//! stages. Each stage runs as one spawned worker owning exactly one input
//! receiver and one output sender; values are forwarded strictly in
//! arrival order, so the pipeline preserves input order end-to-end while
//! distinct elements occupy different stages concurrently.
//!
//! Cancellation is a one-shot broadcast carried by a
//! [`CancellationToken`](tokio_util::sync::CancellationToken). Every
//! suspension point in a stage races against it, so after the token fires
//! each worker stops within one element's processing latency, closes its
//! output, and terminates. Cancellation is not an error: the externally
//! visible stream simply ends early, and elements already delivered
//! remain valid.
//!
//! End-of-stream is structural (channel closure), never a sentinel value;
//! `None`-like payloads such as `Option<T>` elements pass through
//! untouched.
//!
//! ```
//! use conveyor_pipeline::Pipeline;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let output = Pipeline::from_iter(1..=5)
//!     .stage(|v| v * 2)
//!     .stage(|v| v + 100)
//!     .stage(|v| v.to_string())
//!     .collect()
//!     .await;
//! assert_eq!(output, ["102", "104", "106", "108", "110"]);
//! # }
//! ```

mod config;
mod pipeline;
mod worker;

pub use config::PipelineConfig;
pub use pipeline::Pipeline;
