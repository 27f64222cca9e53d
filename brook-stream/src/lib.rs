//! Cross-thread bridge from a push sink to a pull iterator.
//!
//! A parser pushes statements into a [`StreamSink`](brook_graph_ir::StreamSink);
//! most consumers would rather pull them. The types here connect the two
//! across a pair of threads:
//!
//! - [`PipedRdfIterator`] / [`PipedStream`]: bounded buffer with
//!   backpressure, an end-of-stream sentinel, and bounded polling that
//!   detects a dead or self-deadlocked producer.
//! - [`BackoffIterator`] / [`BackoffStream`]: a single-shot variant that
//!   polls an unbounded queue with growing sleeps.
//!
//! Exactly one producer thread and one consumer thread per pipe is the
//! supported configuration.

pub mod backoff;
pub mod config;
pub mod error;
mod liveness;
pub mod piped;

pub use backoff::{BackoffIterator, BackoffStream};
pub use config::{BackoffConfig, PipeConfig, DEFAULT_BUFFER_SIZE};
pub use error::{PipeError, Result, Side};
pub use piped::{Canceller, PipedRdfIterator, PipedStream};
