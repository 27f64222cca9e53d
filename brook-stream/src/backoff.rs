//! Single-shot pipe with backoff polling.
//!
//! A lighter alternative to [`PipedRdfIterator`](crate::PipedRdfIterator):
//! no end sentinel and no bounded buffer. The consumer polls an unbounded
//! queue, sleeping a little longer after each empty poll (up to
//! [`BackoffConfig::max_delay_ms`]) until the producer sets `finished`.
//! The pipe runs once; it cannot be restarted after it finishes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

use brook_graph_ir::{Quad, SinkError, SinkResult, StreamSink, Triple};
use parking_lot::Mutex;

use crate::config::BackoffConfig;
use crate::error::{PipeError, Result};

struct BackoffState<T> {
    queue: VecDeque<T>,
    connected: bool,
    started: bool,
    finished: bool,
    closed: bool,
    writer_dropped: bool,
}

/// Consumer end of a backoff pipe.
pub struct BackoffIterator<T> {
    shared: Arc<Mutex<BackoffState<T>>>,
    config: BackoffConfig,
}

impl<T> BackoffIterator<T> {
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            shared: Arc::new(Mutex::new(BackoffState {
                queue: VecDeque::new(),
                connected: false,
                started: false,
                finished: false,
                closed: false,
                writer_dropped: false,
            })),
            config,
        }
    }

    /// Create the producer end; only one per pipe.
    pub fn connect(&self) -> Result<BackoffStream<T>> {
        let mut state = self.shared.lock();
        if state.connected {
            return Err(PipeError::AlreadyConnected);
        }
        state.connected = true;
        Ok(BackoffStream {
            shared: Arc::clone(&self.shared),
        })
    }

    /// Stop reading; the producer's next `receive` fails.
    pub fn close(&mut self) {
        let mut state = self.shared.lock();
        state.closed = true;
        state.queue.clear();
    }

    /// Next item, or `None` once the producer has finished and the queue is
    /// drained.
    pub fn poll_next(&mut self) -> Result<Option<T>> {
        let mut empty_polls = 0u32;
        loop {
            {
                let mut state = self.shared.lock();
                if state.closed {
                    return Err(PipeError::ClosedByReader);
                }
                if !state.connected {
                    return Err(PipeError::NotConnected);
                }
                if let Some(item) = state.queue.pop_front() {
                    return Ok(Some(item));
                }
                if state.finished {
                    return Ok(None);
                }
                if state.writer_dropped {
                    tracing::warn!("backoff pipe producer dropped before finish");
                    return Err(PipeError::ProducerDead);
                }
            }
            let delay = self.config.delay(empty_polls);
            if delay.is_zero() {
                thread::yield_now();
            } else {
                thread::sleep(delay);
            }
            empty_polls = empty_polls.saturating_add(1);
        }
    }
}

impl<T> Iterator for BackoffIterator<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.poll_next().transpose()
    }
}

impl<T> Drop for BackoffIterator<T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Producer end of a backoff pipe.
pub struct BackoffStream<T> {
    shared: Arc<Mutex<BackoffState<T>>>,
}

impl<T> BackoffStream<T> {
    /// Start the pipe; a second start, even after finishing, fails.
    pub fn start(&mut self) -> Result<()> {
        let mut state = self.shared.lock();
        if state.started {
            return Err(PipeError::AlreadyStarted);
        }
        state.started = true;
        tracing::debug!("backoff pipe started");
        Ok(())
    }

    pub fn receive(&mut self, item: T) -> Result<()> {
        let mut state = self.shared.lock();
        if state.closed {
            return Err(PipeError::ClosedByReader);
        }
        if state.finished {
            return Err(PipeError::ClosedByWriter);
        }
        if !state.started {
            return Err(PipeError::NotStarted);
        }
        state.queue.push_back(item);
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        let mut state = self.shared.lock();
        if !state.started {
            return Err(PipeError::NotStarted);
        }
        state.finished = true;
        tracing::debug!(buffered = state.queue.len(), "backoff pipe finished");
        Ok(())
    }
}

impl<T> Drop for BackoffStream<T> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        if !state.finished {
            state.writer_dropped = true;
        }
    }
}

/// Triples-only: quads are dropped, as are base and prefixes.
impl StreamSink for BackoffStream<Triple> {
    fn on_start(&mut self) -> SinkResult {
        self.start().map_err(SinkError::from_source)
    }

    fn on_base(&mut self, _iri: &str) -> SinkResult {
        Ok(())
    }

    fn on_prefix(&mut self, _prefix: &str, _iri: &str) -> SinkResult {
        Ok(())
    }

    fn on_triple(&mut self, triple: Triple) -> SinkResult {
        self.receive(triple).map_err(SinkError::from_source)
    }

    fn on_quad(&mut self, _quad: Quad) -> SinkResult {
        Ok(())
    }

    fn on_finish(&mut self) -> SinkResult {
        self.finish().map_err(SinkError::from_source)
    }
}

/// Quads-only: triples are dropped, as are base and prefixes.
impl StreamSink for BackoffStream<Quad> {
    fn on_start(&mut self) -> SinkResult {
        self.start().map_err(SinkError::from_source)
    }

    fn on_base(&mut self, _iri: &str) -> SinkResult {
        Ok(())
    }

    fn on_prefix(&mut self, _prefix: &str, _iri: &str) -> SinkResult {
        Ok(())
    }

    fn on_triple(&mut self, _triple: Triple) -> SinkResult {
        Ok(())
    }

    fn on_quad(&mut self, quad: Quad) -> SinkResult {
        self.receive(quad).map_err(SinkError::from_source)
    }

    fn on_finish(&mut self) -> SinkResult {
        self.finish().map_err(SinkError::from_source)
    }
}
