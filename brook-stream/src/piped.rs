//! Bounded push-to-pull bridge between a producer thread and a consumer
//! thread.
//!
//! The producer writes through a [`PipedStream`]; the consumer reads through
//! the [`PipedRdfIterator`] it was connected from. Items travel through a
//! bounded FIFO; the end of the stream is a sentinel message queued behind
//! the last item. Base IRI and prefixes travel on a side channel under its
//! own lock so the consumer can read them while items are still queued.
//!
//! A waiting consumer polls with a bounded timeout a bounded number of
//! times. Between polls it checks that the producer is still alive and not
//! the consumer's own thread, so a dead or misused producer surfaces as a
//! [`PipeError`] instead of a hang.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use brook_graph_ir::{Quad, SinkError, SinkResult, StreamSink, Triple};
use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::config::PipeConfig;
use crate::error::{PipeError, Result, Side};
use crate::liveness::ThreadHandle;

enum Message<T> {
    Item(T),
    End,
}

struct PipeState<T> {
    buffer: VecDeque<Message<T>>,
    connected: bool,
    started: bool,
    closed_by_reader: bool,
    closed_by_writer: bool,
    /// End sentinel seen by the consumer
    finished: bool,
    /// Stream dropped without `finish`
    writer_dropped: bool,
    producer: Option<ThreadHandle>,
    consumer: Option<ThreadHandle>,
}

impl<T> PipeState<T> {
    fn new() -> Self {
        Self {
            buffer: VecDeque::new(),
            connected: false,
            started: false,
            closed_by_reader: false,
            closed_by_writer: false,
            finished: false,
            writer_dropped: false,
            producer: None,
            consumer: None,
        }
    }
}

#[derive(Default)]
struct SideChannel {
    base: Option<String>,
    prefixes: BTreeMap<String, String>,
}

struct Pipe<T> {
    config: PipeConfig,
    state: Mutex<PipeState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    side: Mutex<SideChannel>,
}

impl<T> Pipe<T> {
    fn release(&self, guard: MutexGuard<'_, PipeState<T>>) {
        if self.config.fair {
            MutexGuard::unlock_fair(guard);
        } else {
            drop(guard);
        }
    }

    fn close_from_reader(&self) {
        let mut state = self.state.lock();
        if state.closed_by_reader {
            return;
        }
        state.closed_by_reader = true;
        state.buffer.clear();
        drop(state);
        self.not_full.notify_all();
        self.not_empty.notify_all();
        tracing::debug!("pipe closed by reader");
    }
}

/// Consumer end of a bounded pipe.
///
/// Items are returned in exactly the order the producer sent them.
/// Dropping the iterator closes the pipe from the reader side, which makes
/// any further `receive` on the producer fail.
///
/// # Example
///
/// ```
/// use brook_stream::{PipeConfig, PipedRdfIterator};
///
/// let mut iter = PipedRdfIterator::<u32>::new(PipeConfig::default());
/// let mut stream = iter.connect().unwrap();
///
/// let producer = std::thread::spawn(move || {
///     stream.start().unwrap();
///     for i in 0..5 {
///         stream.receive(i).unwrap();
///     }
///     stream.finish().unwrap();
/// });
///
/// let items: Vec<u32> = iter.by_ref().collect::<Result<_, _>>().unwrap();
/// assert_eq!(items, vec![0, 1, 2, 3, 4]);
/// producer.join().unwrap();
/// ```
pub struct PipedRdfIterator<T> {
    pipe: Arc<Pipe<T>>,
    lookahead: Option<T>,
    /// Set after an error so the `Iterator` impl fuses
    failed: bool,
}

impl<T> PipedRdfIterator<T> {
    pub fn new(config: PipeConfig) -> Self {
        let capacity = config.capacity().min(1024);
        Self {
            pipe: Arc::new(Pipe {
                config,
                state: Mutex::new(PipeState {
                    buffer: VecDeque::with_capacity(capacity),
                    ..PipeState::new()
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                side: Mutex::new(SideChannel::default()),
            }),
            lookahead: None,
            failed: false,
        }
    }

    /// Create the producer end. Only one stream may be connected.
    pub fn connect(&self) -> Result<PipedStream<T>> {
        let mut state = self.pipe.state.lock();
        if state.connected {
            return Err(PipeError::AlreadyConnected);
        }
        state.connected = true;
        tracing::debug!(capacity = self.pipe.config.capacity(), "pipe connected");
        Ok(PipedStream {
            pipe: Arc::clone(&self.pipe),
        })
    }

    /// A handle that can close the pipe from any thread, waking a consumer
    /// blocked in [`has_next`](Self::has_next).
    pub fn canceller(&self) -> Canceller<T> {
        Canceller {
            pipe: Arc::clone(&self.pipe),
        }
    }

    /// Whether another item is available, waiting for the producer if the
    /// buffer is empty.
    ///
    /// Returns `Ok(false)` once the producer has finished and everything it
    /// sent has been consumed.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.lookahead.is_some() {
            return Ok(true);
        }

        let pipe = Arc::clone(&self.pipe);
        let mut state = pipe.state.lock();
        if state.finished {
            return Ok(false);
        }
        if state.closed_by_reader {
            return Err(PipeError::ClosedByReader);
        }
        if !state.connected {
            return Err(PipeError::NotConnected);
        }
        if state.consumer.as_ref().map_or(true, |c| !c.is_current()) {
            state.consumer = Some(ThreadHandle::current());
        }

        let max_polls = pipe.config.max_polls.max(1);
        for _ in 0..max_polls {
            if let Some(message) = state.buffer.pop_front() {
                pipe.release(state);
                pipe.not_full.notify_one();
                return match message {
                    Message::Item(item) => {
                        self.lookahead = Some(item);
                        Ok(true)
                    }
                    Message::End => {
                        pipe.state.lock().finished = true;
                        tracing::debug!("pipe drained");
                        Ok(false)
                    }
                };
            }

            if let Some(err) = producer_failure(&state) {
                tracing::warn!(error = %err, "pipe broken");
                return Err(err);
            }

            pipe.not_empty.wait_for(&mut state, pipe.config.poll_timeout());

            if state.closed_by_reader {
                return Err(PipeError::Interrupted);
            }
        }

        // One last look: the item may have arrived with the final timeout
        if !state.buffer.is_empty() {
            drop(state);
            return self.has_next();
        }

        let err = PipeError::Stalled {
            side: Side::Producer,
            attempts: max_polls,
        };
        tracing::warn!(error = %err, "pipe broken");
        Err(err)
    }

    /// Take the next item.
    ///
    /// Fails with [`PipeError::NotStarted`] if the producer has not started
    /// yet and nothing is cached, and with [`PipeError::Exhausted`] after the
    /// end of the stream.
    pub fn try_next(&mut self) -> Result<T> {
        if self.lookahead.is_none() && !self.pipe.state.lock().started {
            return Err(PipeError::NotStarted);
        }
        if !self.has_next()? {
            return Err(PipeError::Exhausted);
        }
        self.lookahead.take().ok_or(PipeError::Exhausted)
    }

    /// Close from the reader side; the producer's next `receive` fails.
    pub fn close(&mut self) {
        self.lookahead = None;
        self.pipe.close_from_reader();
    }

    /// Base IRI most recently sent by the producer.
    pub fn base_iri(&self) -> Option<String> {
        self.pipe.side.lock().base.clone()
    }

    /// Prefixes sent so far.
    pub fn prefixes(&self) -> BTreeMap<String, String> {
        self.pipe.side.lock().prefixes.clone()
    }
}

impl<T> Iterator for PipedRdfIterator<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.has_next() {
            Ok(true) => self.lookahead.take().map(Ok),
            Ok(false) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl<T> Drop for PipedRdfIterator<T> {
    fn drop(&mut self) {
        self.pipe.close_from_reader();
    }
}

/// Why the consumer should stop waiting, if anything.
fn producer_failure<T>(state: &PipeState<T>) -> Option<PipeError> {
    if state.closed_by_writer {
        // End sentinel is queued or already consumed
        return None;
    }
    if state.writer_dropped {
        return Some(PipeError::ProducerDead);
    }
    match &state.producer {
        Some(producer) if producer.is_current() => Some(PipeError::SelfDeadlock),
        Some(producer) if !producer.is_alive() => {
            tracing::debug!(thread = producer.name(), "producer thread exited");
            Some(PipeError::ProducerDead)
        }
        _ => None,
    }
}

/// Closes a pipe from the reader side, from any thread.
pub struct Canceller<T> {
    pipe: Arc<Pipe<T>>,
}

impl<T> Canceller<T> {
    pub fn cancel(&self) {
        self.pipe.close_from_reader();
    }
}

/// Producer end of a bounded pipe.
///
/// Call [`start`](Self::start) first, then [`receive`](Self::receive) for
/// each item and [`finish`](Self::finish) at the end. Dropping the stream
/// without finishing tells the consumer the producer is gone.
pub struct PipedStream<T> {
    pipe: Arc<Pipe<T>>,
}

impl<T> PipedStream<T> {
    /// Mark the pipe active and record the producing thread.
    pub fn start(&mut self) -> Result<()> {
        let mut state = self.pipe.state.lock();
        if state.started {
            return Err(PipeError::AlreadyStarted);
        }
        if state.closed_by_reader {
            return Err(PipeError::ClosedByReader);
        }
        state.started = true;
        let producer = ThreadHandle::current();
        tracing::debug!(thread = producer.name(), "pipe started");
        state.producer = Some(producer);
        drop(state);
        self.pipe.not_empty.notify_all();
        Ok(())
    }

    /// Queue one item, blocking while the buffer is full.
    ///
    /// Waits at most `max_polls` poll timeouts for the consumer to make
    /// room, then fails with [`PipeError::Stalled`] naming the consumer.
    pub fn receive(&mut self, item: T) -> Result<()> {
        let pipe = &self.pipe;
        let max_polls = pipe.config.max_polls.max(1);
        let mut waits = 0;
        let mut state = pipe.state.lock();
        loop {
            consumer_failure(&state)?;
            if state.buffer.len() < pipe.config.capacity() {
                break;
            }
            if state.consumer.as_ref().is_some_and(ThreadHandle::is_current) {
                tracing::warn!("pipe full and consumer is this thread");
                return Err(PipeError::SelfDeadlock);
            }
            if waits == max_polls {
                let err = PipeError::Stalled {
                    side: Side::Consumer,
                    attempts: max_polls,
                };
                tracing::warn!(error = %err, "pipe broken");
                return Err(err);
            }
            pipe.not_full.wait_for(&mut state, pipe.config.poll_timeout());
            waits += 1;
        }

        state.buffer.push_back(Message::Item(item));
        pipe.release(state);
        pipe.not_empty.notify_one();
        Ok(())
    }

    /// Record the base IRI for the consumer.
    pub fn base(&self, iri: &str) {
        self.pipe.side.lock().base = Some(iri.to_string());
    }

    /// Record a prefix binding for the consumer.
    pub fn prefix(&self, prefix: &str, iri: &str) {
        self.pipe
            .side
            .lock()
            .prefixes
            .insert(prefix.to_string(), iri.to_string());
    }

    /// Queue the end sentinel and close from the writer side.
    pub fn finish(&mut self) -> Result<()> {
        let mut state = self.pipe.state.lock();
        if state.closed_by_writer {
            return Ok(());
        }
        if state.closed_by_reader {
            return Err(PipeError::ClosedByReader);
        }
        if !state.started {
            return Err(PipeError::NotStarted);
        }
        // The sentinel may exceed capacity by one; finishing never blocks
        state.buffer.push_back(Message::End);
        state.closed_by_writer = true;
        tracing::debug!(buffered = state.buffer.len() - 1, "pipe finished");
        drop(state);
        self.pipe.not_empty.notify_all();
        Ok(())
    }
}

impl<T> Drop for PipedStream<T> {
    fn drop(&mut self) {
        let mut state = self.pipe.state.lock();
        if !state.closed_by_writer {
            state.writer_dropped = true;
            drop(state);
            self.pipe.not_empty.notify_all();
            tracing::debug!("pipe stream dropped before finish");
        }
    }
}

fn consumer_failure<T>(state: &PipeState<T>) -> Result<()> {
    if state.closed_by_reader {
        return Err(PipeError::ClosedByReader);
    }
    if state.closed_by_writer {
        return Err(PipeError::ClosedByWriter);
    }
    if !state.started {
        return Err(PipeError::NotStarted);
    }
    match &state.consumer {
        Some(consumer) if !consumer.is_alive() => {
            tracing::warn!(thread = consumer.name(), "consumer thread exited");
            Err(PipeError::ConsumerDead)
        }
        _ => Ok(()),
    }
}

/// Triples-only stream: quads are dropped.
impl StreamSink for PipedStream<Triple> {
    fn on_start(&mut self) -> SinkResult {
        self.start().map_err(SinkError::from_source)
    }

    fn on_base(&mut self, iri: &str) -> SinkResult {
        self.base(iri);
        Ok(())
    }

    fn on_prefix(&mut self, prefix: &str, iri: &str) -> SinkResult {
        self.prefix(prefix, iri);
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

/// Quads-only stream: triples are dropped.
impl StreamSink for PipedStream<Quad> {
    fn on_start(&mut self) -> SinkResult {
        self.start().map_err(SinkError::from_source)
    }

    fn on_base(&mut self, iri: &str) -> SinkResult {
        self.base(iri);
        Ok(())
    }

    fn on_prefix(&mut self, prefix: &str, iri: &str) -> SinkResult {
        self.prefix(prefix, iri);
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

impl<T> std::fmt::Debug for PipedRdfIterator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.pipe.state.lock();
        f.debug_struct("PipedRdfIterator")
            .field("item", &std::any::type_name::<T>())
            .field("buffered", &state.buffer.len())
            .field("started", &state.started)
            .field("finished", &state.finished)
            .finish()
    }
}
