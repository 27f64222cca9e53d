//! StreamSink trait for push-style statement delivery
//!
//! Parsers call `on_start()` once, then `on_base()`, `on_prefix()`,
//! `on_triple()` and `on_quad()` in document order, and finally
//! `on_finish()`. The sink can be:
//! - `DatasetCollectorSink`: Collects everything into a `Dataset`
//! - A piped stream that hands statements to an iterator on another thread
//!
//! Sinks that support only one statement kind silently drop the other
//! (a triples-only sink ignores `on_quad`).

use crate::{Dataset, Quad, Triple};

/// Failure reported by a sink, e.g. because the consumer behind it went away.
///
/// Returning this from any sink method aborts the producer that is pushing
/// into the sink.
#[derive(Debug, thiserror::Error)]
#[error("sink rejected statement: {message}")]
pub struct SinkError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl SinkError {
    /// Create a sink error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error
    pub fn from_source(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for sink operations
pub type SinkResult = std::result::Result<(), SinkError>;

/// Event-driven interface receiving parsed statements
///
/// # Example
///
/// ```
/// use brook_graph_ir::{DatasetCollectorSink, StreamSink, Term, Triple};
///
/// let mut sink = DatasetCollectorSink::new();
/// sink.on_start().unwrap();
/// sink.on_prefix("foaf", "http://xmlns.com/foaf/0.1/").unwrap();
/// sink.on_triple(Triple::new(
///     Term::iri("http://example.org/alice"),
///     Term::iri("http://xmlns.com/foaf/0.1/name"),
///     Term::plain("Alice"),
/// ))
/// .unwrap();
/// sink.on_finish().unwrap();
///
/// let dataset = sink.finish();
/// assert_eq!(dataset.triples().len(), 1);
/// ```
pub trait StreamSink {
    /// Called once before any other event
    fn on_start(&mut self) -> SinkResult {
        Ok(())
    }

    /// Called when a base IRI is declared
    ///
    /// In Turtle: `@base <http://example.org/> .`
    fn on_base(&mut self, base_iri: &str) -> SinkResult;

    /// Called when a prefix is declared
    ///
    /// In Turtle: `@prefix foaf: <http://xmlns.com/foaf/0.1/> .`
    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str) -> SinkResult;

    /// Deliver a triple
    fn on_triple(&mut self, triple: Triple) -> SinkResult;

    /// Deliver a quad
    fn on_quad(&mut self, quad: Quad) -> SinkResult;

    /// Called once after the last statement
    fn on_finish(&mut self) -> SinkResult {
        Ok(())
    }
}

impl<S: StreamSink + ?Sized> StreamSink for &mut S {
    fn on_start(&mut self) -> SinkResult {
        (**self).on_start()
    }

    fn on_base(&mut self, base_iri: &str) -> SinkResult {
        (**self).on_base(base_iri)
    }

    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str) -> SinkResult {
        (**self).on_prefix(prefix, namespace_iri)
    }

    fn on_triple(&mut self, triple: Triple) -> SinkResult {
        (**self).on_triple(triple)
    }

    fn on_quad(&mut self, quad: Quad) -> SinkResult {
        (**self).on_quad(quad)
    }

    fn on_finish(&mut self) -> SinkResult {
        (**self).on_finish()
    }
}

/// A sink that collects statements into a `Dataset`
///
/// This is the direct, same-thread consumption mode.
#[derive(Debug, Default)]
pub struct DatasetCollectorSink {
    dataset: Dataset,
    started: bool,
    finished: bool,
}

impl DatasetCollectorSink {
    /// Create a new collector sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish building and return the dataset
    pub fn finish(self) -> Dataset {
        self.dataset
    }

    /// Get the current dataset (non-consuming)
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Whether `on_start` has been seen
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether `on_finish` has been seen
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl StreamSink for DatasetCollectorSink {
    fn on_start(&mut self) -> SinkResult {
        self.started = true;
        Ok(())
    }

    fn on_base(&mut self, base_iri: &str) -> SinkResult {
        self.dataset.set_base(base_iri);
        Ok(())
    }

    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str) -> SinkResult {
        self.dataset.add_prefix(prefix, namespace_iri);
        Ok(())
    }

    fn on_triple(&mut self, triple: Triple) -> SinkResult {
        self.dataset.add_triple(triple);
        Ok(())
    }

    fn on_quad(&mut self, quad: Quad) -> SinkResult {
        self.dataset.add_quad(quad);
        Ok(())
    }

    fn on_finish(&mut self) -> SinkResult {
        self.finished = true;
        Ok(())
    }
}
