//! The `RdfParser` builder: configure once, parse into a sink, a dataset,
//! or an iterator fed from a worker thread.

use std::sync::Arc;
use std::thread;

use brook_bnode::{AllocStrategy, LabelMapping, LabelToNode, ScopePolicy, SharedLabelToNode};
use brook_graph_ir::{Dataset, DatasetCollectorSink, Quad, StreamSink, Triple};
use brook_graph_turtle::{parse, ErrorHandler, ParseContext, Syntax};
use brook_stream::{PipeConfig, PipedRdfIterator, PipedStream};

use crate::config::ParserConfig;
use crate::error::Result;

/// Configurable entry point for parsing RDF text.
///
/// ```
/// use brook_rdf::{RdfParser, Syntax};
///
/// let dataset = RdfParser::new(Syntax::Turtle)
///     .base("http://example.org/")
///     .parse_to_dataset("<alice> <knows> <bob> .")
///     .unwrap();
///
/// assert_eq!(dataset.triples()[0].s.as_iri(), Some("http://example.org/alice"));
/// ```
#[derive(Clone, Default)]
pub struct RdfParser {
    config: ParserConfig,
    labels: Option<SharedLabelToNode>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl std::fmt::Debug for RdfParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RdfParser")
            .field("config", &self.config)
            .field("shared_labels", &self.labels.is_some())
            .finish()
    }
}

impl RdfParser {
    pub fn new(syntax: Syntax) -> Self {
        Self::from_config(ParserConfig::new(syntax))
    }

    pub fn from_config(config: ParserConfig) -> Self {
        Self {
            config,
            labels: None,
            error_handler: None,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn syntax(mut self, syntax: Syntax) -> Self {
        self.config.syntax = syntax;
        self
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.config.base = Some(base.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    pub fn allocator(mut self, strategy: AllocStrategy) -> Self {
        self.config.allocator = strategy;
        self
    }

    pub fn scope(mut self, policy: ScopePolicy) -> Self {
        self.config.scope = policy;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Use a long-lived label mapping shared with other parsers, instead of
    /// a fresh one per run. The configured strategy and scope are ignored.
    pub fn shared_labels(mut self, labels: SharedLabelToNode) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// A fresh parse context for one run.
    pub fn context(&self) -> Result<ParseContext> {
        let labels: LabelMapping = match &self.labels {
            Some(shared) => shared.clone().into(),
            None => LabelToNode::new(self.config.scope, self.config.allocator.clone())?.into(),
        };

        let mut ctx = ParseContext::new()
            .with_strict(self.config.strict)
            .with_max_depth(self.config.max_depth)
            .with_labels(labels);
        if let Some(base) = &self.config.base {
            ctx = ctx.with_base(base.clone());
        }
        if let Some(handler) = &self.error_handler {
            ctx = ctx.with_error_handler(Arc::clone(handler));
        }
        Ok(ctx)
    }

    /// Parse `input`, pushing everything into `sink`.
    pub fn parse<S: StreamSink + ?Sized>(&self, input: &str, sink: &mut S) -> Result<()> {
        let mut ctx = self.context()?;
        parse(self.config.syntax, input, &mut ctx, sink)?;
        Ok(())
    }

    /// Parse `input` into an in-memory dataset.
    pub fn parse_to_dataset(&self, input: &str) -> Result<Dataset> {
        let mut sink = DatasetCollectorSink::new();
        self.parse(input, &mut sink)?;
        Ok(sink.finish())
    }

    /// Parse on a worker thread, returning an iterator over the triples.
    ///
    /// Quads (from TriG or N-Quads) are dropped. A syntax error is reported
    /// to the error handler and ends the stream: the iterator then yields
    /// [`PipeError::ProducerDead`](brook_stream::PipeError::ProducerDead).
    pub fn spawn_triples(
        &self,
        input: impl Into<String>,
        pipe: PipeConfig,
    ) -> Result<PipedRdfIterator<Triple>> {
        self.spawn(input.into(), pipe)
    }

    /// Parse on a worker thread, returning an iterator over the quads.
    ///
    /// Triples (from Turtle or N-Triples) are dropped.
    pub fn spawn_quads(
        &self,
        input: impl Into<String>,
        pipe: PipeConfig,
    ) -> Result<PipedRdfIterator<Quad>> {
        self.spawn(input.into(), pipe)
    }

    fn spawn<T>(&self, input: String, pipe: PipeConfig) -> Result<PipedRdfIterator<T>>
    where
        T: Send + 'static,
        PipedStream<T>: StreamSink,
    {
        let mut ctx = self.context()?;
        let syntax = self.config.syntax;
        let iter = PipedRdfIterator::new(pipe);
        let mut stream = iter.connect()?;

        thread::Builder::new()
            .name(format!("brook-parse-{}", syntax.file_extension()))
            .spawn(move || {
                if let Err(err) = parse(syntax, &input, &mut ctx, &mut stream) {
                    tracing::debug!(%syntax, error = %err, "parse worker stopped");
                }
            })?;

        Ok(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RdfError;
    use brook_bnode::AllocError;
    use brook_graph_ir::{GraphName, Term};
    use brook_graph_turtle::CollectingErrorHandler;
    use brook_stream::PipeError;
    use std::time::Duration;

    const TTL: &str = r#"
        @prefix ex: <http://example.org/> .
        ex:alice ex:knows _:b .
        _:b ex:name "Bob" .
    "#;

    #[test]
    fn test_parse_to_dataset() {
        let dataset = RdfParser::new(Syntax::Turtle).parse_to_dataset(TTL).unwrap();
        assert_eq!(dataset.triples().len(), 2);
        assert_eq!(dataset.triples()[0].o, dataset.triples()[1].s);
    }

    #[test]
    fn test_invalid_allocator_config() {
        let err = RdfParser::new(Syntax::Turtle)
            .allocator(AllocStrategy::seeded(""))
            .parse_to_dataset(TTL)
            .unwrap_err();
        assert!(matches!(err, RdfError::Alloc(AllocError::EmptySeed)));
    }

    #[test]
    fn test_strict_flag_reaches_grammar() {
        let input = "<http://example.org/s> <http://example.org/p> 'x' .";
        assert!(RdfParser::new(Syntax::Turtle).parse_to_dataset(input).is_ok());
        let err = RdfParser::new(Syntax::Turtle)
            .strict(true)
            .parse_to_dataset(input)
            .unwrap_err();
        assert!(matches!(err, RdfError::Parse(_)));
    }

    #[test]
    fn test_seeded_labels_ignore_document_order() {
        let parser = RdfParser::new(Syntax::NTriples).allocator(AllocStrategy::seeded("fixed"));

        let first = parser
            .parse_to_dataset("_:a <http://example.org/p> \"1\" .\n_:z <http://example.org/p> \"2\" .")
            .unwrap();
        let second = parser
            .parse_to_dataset("_:z <http://example.org/p> \"2\" .\n_:a <http://example.org/p> \"1\" .")
            .unwrap();

        assert_eq!(first.triples()[0].s, second.triples()[1].s);
        assert_eq!(first.triples()[1].s, second.triples()[0].s);
        assert_ne!(first.triples()[0].s, first.triples()[1].s);
    }

    #[test]
    fn test_shared_labels_span_runs() {
        let labels = SharedLabelToNode::new(
            LabelToNode::new(ScopePolicy::Single, AllocStrategy::GlobalMap).unwrap(),
        );
        let parser = RdfParser::new(Syntax::NTriples).shared_labels(labels.clone());

        let one = parser
            .parse_to_dataset("_:x <http://example.org/p> \"1\" .")
            .unwrap();
        let two = parser
            .parse_to_dataset("_:x <http://example.org/p> \"2\" .")
            .unwrap();
        assert_eq!(one.triples()[0].s, two.triples()[0].s);

        labels.reset();
        let three = parser
            .parse_to_dataset("_:x <http://example.org/p> \"3\" .")
            .unwrap();
        assert_ne!(one.triples()[0].s, three.triples()[0].s);
    }

    #[test]
    fn test_spawn_triples() {
        let mut iter = RdfParser::new(Syntax::Turtle)
            .spawn_triples(TTL, PipeConfig::new().with_buffer_size(1))
            .unwrap();

        let triples: Vec<Triple> = iter.by_ref().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(triples.len(), 2);
        assert_eq!(
            iter.prefixes().get("ex").map(String::as_str),
            Some("http://example.org/")
        );
    }

    #[test]
    fn test_spawn_quads_from_trig() {
        let iter = RdfParser::new(Syntax::TriG)
            .spawn_quads(
                "<http://example.org/g> { <http://example.org/s> <http://example.org/p> 1 }",
                PipeConfig::default(),
            )
            .unwrap();

        let quads: Vec<Quad> = iter.collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(
            quads[0].g,
            GraphName::Named(Term::iri("http://example.org/g"))
        );
    }

    #[test]
    fn test_spawn_with_syntax_error() {
        let handler = Arc::new(CollectingErrorHandler::new());
        let iter = RdfParser::new(Syntax::NTriples)
            .error_handler(handler.clone())
            .spawn_triples(
                "<http://example.org/s> <http://example.org/p> \"ok\" .\n<http://example.org/s> \"p\" <http://example.org/o> .\n",
                PipeConfig::new().with_poll_timeout(Duration::from_millis(50)),
            )
            .unwrap();

        let results: Vec<_> = iter.collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(PipeError::ProducerDead));
        assert_eq!(handler.errors().len(), 1);
        assert_eq!(handler.errors()[0].position.line, 2);
    }
}
