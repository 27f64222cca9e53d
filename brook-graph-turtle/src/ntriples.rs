//! N-Triples and N-Quads grammars.
//!
//! One statement per line: `subject predicate object graph? .` with no
//! directives and no abbreviations. The optional graph term is read before
//! the other terms are resolved, so blank-node labels are scoped to the
//! statement's graph.

use brook_graph_ir::{GraphName, StreamSink, Term};

use crate::context::ParseContext;
use crate::engine::TokenStream;
use crate::error::{Result, TurtleError};
use crate::lex::{Quote, Token, TokenKind};

/// Parse an N-Triples document, emitting triples to `sink`.
pub fn parse_ntriples<S: StreamSink + ?Sized>(
    input: &str,
    ctx: &mut ParseContext,
    sink: &mut S,
) -> Result<()> {
    LineGrammar::new(input, ctx, sink, false).run()
}

/// Parse an N-Quads document, emitting quads to `sink`.
///
/// Statements without a graph term go to the default graph.
pub fn parse_nquads<S: StreamSink + ?Sized>(
    input: &str,
    ctx: &mut ParseContext,
    sink: &mut S,
) -> Result<()> {
    LineGrammar::new(input, ctx, sink, true).run()
}

/// Object as read from the line, resolved only after the graph term is known.
enum RawObject {
    Term(Token),
    Literal {
        token: Token,
        /// Language tag, or the IRI token following `^^`
        suffix: Option<Token>,
    },
}

struct LineGrammar<'a, 'c, S: ?Sized> {
    tokens: TokenStream<'a>,
    ctx: &'c mut ParseContext,
    sink: &'c mut S,
    quads: bool,
    emitted: usize,
}

impl<'a, 'c, S: StreamSink + ?Sized> LineGrammar<'a, 'c, S> {
    fn new(input: &'a str, ctx: &'c mut ParseContext, sink: &'c mut S, quads: bool) -> Self {
        Self {
            tokens: TokenStream::new(input, ctx.error_handler().clone()),
            ctx,
            sink,
            quads,
            emitted: 0,
        }
    }

    fn run(mut self) -> Result<()> {
        self.sink.on_start()?;
        while !self.tokens.eof()? {
            self.statement()?;
        }
        self.sink.on_finish()?;
        tracing::debug!(
            quads = self.quads,
            statements = self.emitted,
            "line-based parse complete"
        );
        Ok(())
    }

    fn statement(&mut self) -> Result<()> {
        let subject = self.tokens.next()?;
        let predicate = self.tokens.next()?;
        let object = self.raw_object()?;

        let graph = if self.quads && !self.tokens.check(&TokenKind::Dot)? {
            Some(self.tokens.next()?)
        } else {
            None
        };
        self.tokens.expect(&TokenKind::Dot)?;

        let graph = match graph {
            Some(token) => GraphName::Named(self.resource(&token, "graph name")?),
            None => GraphName::Default,
        };
        self.ctx.set_current_graph(graph.clone());

        let s = self.resource(&subject, "subject")?;
        let p = self.iri(&predicate, "predicate")?;
        let o = self.object(object)?;

        self.ctx.set_current_graph(GraphName::Default);

        if self.quads {
            let quad = self
                .ctx
                .create_quad(graph, s, p, o)
                .map_err(|e| self.tokens.fail(e.at(subject.position)))?;
            self.sink.on_quad(quad)?;
        } else {
            let triple = self
                .ctx
                .create_triple(s, p, o)
                .map_err(|e| self.tokens.fail(e.at(subject.position)))?;
            self.sink.on_triple(triple)?;
        }
        self.emitted += 1;
        Ok(())
    }

    /// Object token plus any literal suffix, unresolved.
    fn raw_object(&mut self) -> Result<RawObject> {
        let token = self.tokens.next()?;
        if !matches!(token.kind, TokenKind::String { .. }) {
            return Ok(RawObject::Term(token));
        }
        let has_suffix = matches!(self.tokens.peek()?.kind, TokenKind::LangTag(_))
            || self.tokens.skip_if(&TokenKind::DoubleCaret)?;
        let suffix = if has_suffix {
            Some(self.tokens.next()?)
        } else {
            None
        };
        Ok(RawObject::Literal { token, suffix })
    }

    fn iri(&mut self, token: &Token, role: &str) -> Result<Term> {
        match &token.kind {
            TokenKind::Iri(iri) => self
                .ctx
                .create_iri(iri)
                .map_err(|e| self.tokens.fail(e.at(token.position))),
            other => Err(self.misplaced(token, role, other)),
        }
    }

    /// IRI or labelled blank node
    fn resource(&mut self, token: &Token, role: &str) -> Result<Term> {
        match &token.kind {
            TokenKind::BlankNodeLabel(label) => Ok(self.ctx.blank_node(Some(&**label))),
            _ => self.iri(token, role),
        }
    }

    fn object(&mut self, object: RawObject) -> Result<Term> {
        let (token, suffix) = match object {
            RawObject::Term(token) => return self.resource(&token, "object"),
            RawObject::Literal { token, suffix } => (token, suffix),
        };
        let (value, quote) = match &token.kind {
            TokenKind::String { value, quote } => (value.clone(), *quote),
            other => return Err(self.misplaced(&token, "object", other)),
        };
        if quote != Quote::Double && self.ctx.is_strict() {
            return Err(self.tokens.fail(TurtleError::parse(
                token.position,
                "only double-quoted strings are allowed in strict mode",
            )));
        }

        let result = match suffix {
            None => self.ctx.create_literal(&value, None, None),
            Some(Token {
                kind: TokenKind::LangTag(lang),
                ..
            }) => self.ctx.create_literal(&value, Some(&*lang), None),
            Some(Token {
                kind: TokenKind::Iri(iri),
                position,
                ..
            }) => {
                let datatype = self
                    .ctx
                    .resolve_iri(&iri)
                    .map_err(|e| self.tokens.fail(e.at(position)))?;
                self.ctx.create_literal(&value, None, Some(datatype.as_str()))
            }
            Some(other) => return Err(self.misplaced(&other, "datatype", &other.kind)),
        };
        result.map_err(|e| self.tokens.fail(e.at(token.position)))
    }

    fn misplaced(&self, token: &Token, role: &str, kind: &TokenKind) -> TurtleError {
        self.tokens.fail(TurtleError::parse(
            token.position,
            format!("unexpected {} as {}", kind, role),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brook_bnode::{AllocStrategy, LabelToNode, ScopePolicy};
    use brook_graph_ir::{Dataset, DatasetCollectorSink, TextPosition};
    use brook_vocab::xsd;

    fn nt(input: &str) -> Result<Dataset> {
        let mut ctx = ParseContext::new();
        let mut sink = DatasetCollectorSink::new();
        parse_ntriples(input, &mut ctx, &mut sink)?;
        Ok(sink.finish())
    }

    fn nq_with(input: &str, mut ctx: ParseContext) -> Result<Dataset> {
        let mut sink = DatasetCollectorSink::new();
        parse_nquads(input, &mut ctx, &mut sink)?;
        Ok(sink.finish())
    }

    #[test]
    fn test_ntriples_statements() {
        let dataset = nt(concat!(
            "<http://example.org/s> <http://example.org/p> <http://example.org/o> .\n",
            "_:b <http://example.org/p> \"chat\"@fr .\n",
            "_:b <http://example.org/p> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n",
        ))
        .unwrap();

        let t = dataset.triples();
        assert_eq!(t.len(), 3);
        assert_eq!(t[1].s, t[2].s);
        assert_eq!(t[1].o, Term::lang_string("chat", "fr"));
        assert_eq!(t[2].o, Term::typed("1", xsd::INTEGER));
    }

    #[test]
    fn test_ntriples_rejects_prefixed_names_and_graphs() {
        assert!(nt("ex:s <http://example.org/p> <http://example.org/o> .").is_err());
        assert!(nt(
            "<http://example.org/s> <http://example.org/p> <http://example.org/o> <http://example.org/g> ."
        )
        .is_err());
    }

    #[test]
    fn test_ntriples_literal_subject() {
        let err = nt("\"s\" <http://example.org/p> <http://example.org/o> .").unwrap_err();
        assert!(matches!(err, TurtleError::Parse { .. }));
        assert_eq!(err.position(), Some(TextPosition::new(1, 1)));
    }

    #[test]
    fn test_ntriples_missing_dot() {
        assert!(nt("<http://example.org/s> <http://example.org/p> <http://example.org/o>").is_err());
    }

    #[test]
    fn test_nquads_graph_term() {
        let dataset = nq_with(
            concat!(
                "<http://example.org/s> <http://example.org/p> <http://example.org/o> <http://example.org/g> .\n",
                "<http://example.org/s> <http://example.org/p> <http://example.org/o> .\n",
            ),
            ParseContext::new(),
        )
        .unwrap();

        let q = dataset.quads();
        assert_eq!(
            q[0].g,
            GraphName::Named(Term::iri("http://example.org/g"))
        );
        assert_eq!(q[1].g, GraphName::Default);
    }

    #[test]
    fn test_nquads_literal_graph_is_rejected() {
        assert!(nq_with(
            "<http://example.org/s> <http://example.org/p> <http://example.org/o> \"g\" .",
            ParseContext::new()
        )
        .is_err());
    }

    #[test]
    fn test_nquads_blank_nodes_scoped_by_graph() {
        let labels = LabelToNode::new(ScopePolicy::PerGraph, AllocStrategy::Counter).unwrap();
        let dataset = nq_with(
            concat!(
                "_:b <http://example.org/p> \"1\" <http://example.org/g1> .\n",
                "_:b <http://example.org/p> \"2\" <http://example.org/g2> .\n",
                "_:b <http://example.org/p> \"3\" <http://example.org/g1> .\n",
            ),
            ParseContext::new().with_labels(labels),
        )
        .unwrap();

        let q = dataset.quads();
        assert_ne!(q[0].s, q[1].s);
        assert_eq!(q[0].s, q[2].s);
    }

    #[test]
    fn test_strict_rejects_single_quotes() {
        let input = "<http://example.org/s> <http://example.org/p> 'x' .";
        assert!(nt(input).is_ok());

        let mut ctx = ParseContext::new().with_strict(true);
        let mut sink = DatasetCollectorSink::new();
        assert!(parse_ntriples(input, &mut ctx, &mut sink).is_err());
    }
}
