//! Turtle and TriG grammars.
//!
//! Both share one production set: directives, `triplesSameSubject`,
//! predicate-object lists, object lists, blank-node property lists and
//! collections. TriG wraps the triple productions in graph blocks and emits
//! quads; Turtle emits triples.

use brook_graph_ir::{GraphName, StreamSink, Term};
use brook_vocab::{owl, rdf, xsd};

use crate::context::ParseContext;
use crate::engine::TokenStream;
use crate::error::Result;
use crate::lex::{Token, TokenKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dialect {
    Turtle,
    TriG,
}

/// Parse a Turtle document, emitting triples to `sink`.
///
/// # Example
///
/// ```
/// use brook_graph_ir::DatasetCollectorSink;
/// use brook_graph_turtle::{parse_turtle, ParseContext};
///
/// let mut ctx = ParseContext::new();
/// let mut sink = DatasetCollectorSink::new();
/// parse_turtle(
///     r#"@prefix ex: <http://example.org/> . ex:alice ex:knows [ ex:name "Bob" ] ."#,
///     &mut ctx,
///     &mut sink,
/// )
/// .unwrap();
/// assert_eq!(sink.finish().triples().len(), 2);
/// ```
pub fn parse_turtle<S: StreamSink + ?Sized>(
    input: &str,
    ctx: &mut ParseContext,
    sink: &mut S,
) -> Result<()> {
    Grammar::new(input, ctx, sink, Dialect::Turtle).run()
}

/// Parse a TriG document, emitting quads to `sink`.
///
/// Triples outside any graph block go to the default graph.
pub fn parse_trig<S: StreamSink + ?Sized>(
    input: &str,
    ctx: &mut ParseContext,
    sink: &mut S,
) -> Result<()> {
    Grammar::new(input, ctx, sink, Dialect::TriG).run()
}

struct Grammar<'a, 'c, S: ?Sized> {
    tokens: TokenStream<'a>,
    ctx: &'c mut ParseContext,
    sink: &'c mut S,
    dialect: Dialect,
    /// Current `[...]` / `(...)` nesting
    depth: usize,
    emitted: usize,
}

impl<'a, 'c, S: StreamSink + ?Sized> Grammar<'a, 'c, S> {
    fn new(input: &'a str, ctx: &'c mut ParseContext, sink: &'c mut S, dialect: Dialect) -> Self {
        Self {
            tokens: TokenStream::new(input, ctx.error_handler().clone()),
            ctx,
            sink,
            dialect,
            depth: 0,
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
            dialect = ?self.dialect,
            statements = self.emitted,
            "parse complete"
        );
        Ok(())
    }

    // ========================================================================
    // Statements and directives
    // ========================================================================

    fn statement(&mut self) -> Result<()> {
        let kind = self.tokens.peek()?.kind.clone();
        match kind {
            TokenKind::KwPrefix => self.prefix_directive(true),
            TokenKind::KwSparqlPrefix => self.prefix_directive(false),
            TokenKind::KwBase => self.base_directive(true),
            TokenKind::KwSparqlBase => self.base_directive(false),
            _ => match self.dialect {
                Dialect::Turtle => {
                    self.triples()?;
                    self.tokens.expect(&TokenKind::Dot)?;
                    Ok(())
                }
                Dialect::TriG => self.trig_block(),
            },
        }
    }

    /// `@prefix p: <iri> .` or `PREFIX p: <iri>`
    fn prefix_directive(&mut self, needs_dot: bool) -> Result<()> {
        self.tokens.next()?;

        let prefix = match self.tokens.next()?.kind {
            TokenKind::PrefixedNameNs(p) => p,
            _ => return Err(self.tokens.raise("expected prefix name ending in ':'")),
        };
        let namespace = match self.tokens.next()?.kind {
            TokenKind::Iri(iri) => iri,
            _ => return Err(self.tokens.raise("expected IRI for prefix namespace")),
        };

        let resolved = self
            .ctx
            .add_prefix(&prefix, &namespace)
            .map_err(|e| self.tokens.fail(e))?;
        tracing::debug!(prefix = %prefix, namespace = %resolved, "prefix");
        self.sink.on_prefix(&prefix, &resolved)?;

        if needs_dot {
            self.tokens.expect(&TokenKind::Dot)?;
        }
        Ok(())
    }

    /// `@base <iri> .` or `BASE <iri>`
    fn base_directive(&mut self, needs_dot: bool) -> Result<()> {
        self.tokens.next()?;

        let iri = match self.tokens.next()?.kind {
            TokenKind::Iri(iri) => iri,
            _ => return Err(self.tokens.raise("expected IRI for base")),
        };

        let resolved = self.ctx.set_base(&iri).map_err(|e| self.tokens.fail(e))?;
        tracing::debug!(base = %resolved, "base");
        self.sink.on_base(&resolved)?;

        if needs_dot {
            self.tokens.expect(&TokenKind::Dot)?;
        }
        Ok(())
    }

    // ========================================================================
    // TriG blocks
    // ========================================================================

    /// One top-level TriG block: a graph block, or triples in the default
    /// graph.
    fn trig_block(&mut self) -> Result<()> {
        let kind = self.tokens.peek()?.kind.clone();
        match kind {
            TokenKind::LBrace => self.graph_block(GraphName::Default),
            TokenKind::KwGraph => {
                self.tokens.next()?;
                let name = self.graph_label()?;
                self.tokens.skip_if(&TokenKind::Equals)?;
                if !self.tokens.check(&TokenKind::LBrace)? {
                    return Err(self.tokens.unexpected("'{' after graph name"));
                }
                self.graph_block(GraphName::Named(name))
            }
            TokenKind::Iri(_)
            | TokenKind::PrefixedName { .. }
            | TokenKind::PrefixedNameNs(_)
            | TokenKind::BlankNodeLabel(_)
            | TokenKind::Anon => {
                let term = self.graph_label()?;
                if self.tokens.check(&TokenKind::LBrace)? {
                    return self.graph_block(GraphName::Named(term));
                }
                if self.tokens.skip_if(&TokenKind::Equals)? {
                    if self.tokens.check(&TokenKind::LBrace)? {
                        return self.graph_block(GraphName::Named(term));
                    }
                    // `:a = :b .` outside a graph block
                    let same_as = self.equals_predicate()?;
                    self.predicate_object_list_from(term, same_as)?;
                } else {
                    self.predicate_object_list(term)?;
                }
                self.tokens.expect(&TokenKind::Dot)?;
                Ok(())
            }
            _ => {
                self.triples()?;
                self.tokens.expect(&TokenKind::Dot)?;
                Ok(())
            }
        }
    }

    /// IRI or blank node naming a graph (or starting a default-graph triple).
    fn graph_label(&mut self) -> Result<Term> {
        let token = self.tokens.next()?;
        match token.kind {
            TokenKind::Iri(_) | TokenKind::PrefixedName { .. } | TokenKind::PrefixedNameNs(_) => {
                self.iri_term(&token)
            }
            TokenKind::BlankNodeLabel(label) => Ok(self.ctx.blank_node(Some(&*label))),
            TokenKind::Anon => Ok(self.ctx.blank_node(None)),
            _ => Err(self.tokens.raise(format!(
                "expected graph name (IRI or blank node), found {}",
                token.kind
            ))),
        }
    }

    /// `{ triples ('.' triples)* '.'? }` followed by an optional `.`
    ///
    /// Repeated blocks for one graph name add to the same graph.
    fn graph_block(&mut self, name: GraphName) -> Result<()> {
        tracing::debug!(graph = %name, "graph block");
        self.tokens.expect(&TokenKind::LBrace)?;
        self.ctx.set_current_graph(name);

        loop {
            if self.tokens.skip_if(&TokenKind::RBrace)? {
                break;
            }
            self.triples()?;
            if self.tokens.skip_if(&TokenKind::Dot)? {
                continue;
            }
            self.tokens.expect(&TokenKind::RBrace)?;
            break;
        }

        self.ctx.set_current_graph(GraphName::Default);
        self.tokens.skip_if(&TokenKind::Dot)?;
        Ok(())
    }

    // ========================================================================
    // Triples
    // ========================================================================

    /// `triplesSameSubject`, without the terminating `.`
    fn triples(&mut self) -> Result<()> {
        let kind = self.tokens.peek()?.kind.clone();
        match kind {
            TokenKind::LBracket => {
                let subject = self.blank_node_property_list()?;
                // `[ :p :o ] .` stands alone
                if self.at_statement_end()? {
                    return Ok(());
                }
                self.predicate_object_list(subject)
            }
            _ => {
                let subject = self.subject()?;
                self.predicate_object_list(subject)
            }
        }
    }

    fn at_statement_end(&mut self) -> Result<bool> {
        Ok(matches!(
            self.tokens.peek()?.kind,
            TokenKind::Dot | TokenKind::RBrace | TokenKind::Eof
        ))
    }

    fn subject(&mut self) -> Result<Term> {
        let kind = self.tokens.peek()?.kind.clone();
        match kind {
            TokenKind::Iri(_) | TokenKind::PrefixedName { .. } | TokenKind::PrefixedNameNs(_) => {
                let token = self.tokens.next()?;
                self.iri_term(&token)
            }
            TokenKind::BlankNodeLabel(label) => {
                self.tokens.next()?;
                Ok(self.ctx.blank_node(Some(&*label)))
            }
            TokenKind::Anon => {
                self.tokens.next()?;
                Ok(self.ctx.blank_node(None))
            }
            TokenKind::LBracket => self.blank_node_property_list(),
            TokenKind::LParen | TokenKind::Nil => self.collection(),
            _ => Err(self.tokens.unexpected("subject")),
        }
    }

    /// `verb objectList (';' (verb objectList)?)*`
    fn predicate_object_list(&mut self, subject: Term) -> Result<()> {
        let predicate = self.verb()?;
        self.predicate_object_list_from(subject, predicate)
    }

    /// Predicate-object list whose first verb has already been read.
    fn predicate_object_list_from(&mut self, subject: Term, first: Term) -> Result<()> {
        let mut predicate = first;
        loop {
            self.object_list(&subject, &predicate)?;

            if !self.tokens.skip_if(&TokenKind::Semicolon)? {
                return Ok(());
            }
            while self.tokens.skip_if(&TokenKind::Semicolon)? {}

            // Trailing semicolons with no following predicate
            if matches!(
                self.tokens.peek()?.kind,
                TokenKind::Dot | TokenKind::RBracket | TokenKind::RBrace | TokenKind::Eof
            ) {
                return Ok(());
            }
            predicate = self.verb()?;
        }
    }

    /// Predicate position: IRI, `a`, and in lenient mode `=` and `=>`.
    fn verb(&mut self) -> Result<Term> {
        let kind = self.tokens.peek()?.kind.clone();
        match kind {
            TokenKind::Iri(_) | TokenKind::PrefixedName { .. } | TokenKind::PrefixedNameNs(_) => {
                let token = self.tokens.next()?;
                self.iri_term(&token)
            }
            TokenKind::KwA => {
                self.tokens.next()?;
                Ok(Term::iri(rdf::TYPE))
            }
            TokenKind::Equals if !self.ctx.is_strict() => {
                self.tokens.next()?;
                self.equals_predicate()
            }
            TokenKind::Implies if !self.ctx.is_strict() => {
                self.tokens.next()?;
                // Legacy behaviour: `=>` is read as rdf:type, not log:implies
                self.tokens.warn("'=>' is read as rdf:type");
                Ok(Term::iri(rdf::TYPE))
            }
            _ => Err(self.tokens.unexpected("predicate")),
        }
    }

    /// The predicate for an already-consumed `=`.
    fn equals_predicate(&mut self) -> Result<Term> {
        if self.ctx.is_strict() {
            return Err(self.tokens.raise("'=' is not allowed in strict mode"));
        }
        Ok(Term::iri(owl::SAME_AS))
    }

    /// `object (',' object)*`, emitting one statement per object.
    fn object_list(&mut self, subject: &Term, predicate: &Term) -> Result<()> {
        loop {
            let object = self.object()?;
            self.emit(subject.clone(), predicate.clone(), object)?;
            if !self.tokens.skip_if(&TokenKind::Comma)? {
                return Ok(());
            }
        }
    }

    fn object(&mut self) -> Result<Term> {
        let kind = self.tokens.peek()?.kind.clone();
        match kind {
            TokenKind::String { .. }
            | TokenKind::Integer(_)
            | TokenKind::Decimal(_)
            | TokenKind::Double(_)
            | TokenKind::KwTrue
            | TokenKind::KwFalse => self.literal(),
            TokenKind::Iri(_)
            | TokenKind::PrefixedName { .. }
            | TokenKind::PrefixedNameNs(_)
            | TokenKind::BlankNodeLabel(_)
            | TokenKind::Anon
            | TokenKind::LBracket
            | TokenKind::LParen
            | TokenKind::Nil => self.subject(),
            _ => Err(self.tokens.unexpected("object")),
        }
    }

    fn literal(&mut self) -> Result<Term> {
        let token = self.tokens.next()?;
        let result = match token.kind {
            TokenKind::String { value, quote } => {
                if quote.is_single() && self.ctx.is_strict() {
                    return Err(self
                        .tokens
                        .raise("single-quoted strings are not allowed in strict mode"));
                }
                if let TokenKind::LangTag(_) = self.tokens.peek()?.kind {
                    let lang = match self.tokens.next()?.kind {
                        TokenKind::LangTag(lang) => lang,
                        _ => return Err(self.tokens.raise("expected language tag")),
                    };
                    self.ctx.create_literal(&value, Some(&*lang), None)
                } else if self.tokens.skip_if(&TokenKind::DoubleCaret)? {
                    let dt_token = self.tokens.next()?;
                    let datatype = match &dt_token.kind {
                        TokenKind::Iri(_)
                        | TokenKind::PrefixedName { .. }
                        | TokenKind::PrefixedNameNs(_) => self.iri_term(&dt_token)?,
                        other => {
                            return Err(self
                                .tokens
                                .raise(format!("expected datatype IRI, found {}", other)))
                        }
                    };
                    let dt = datatype.as_iri().unwrap_or_default().to_string();
                    self.ctx.create_literal(&value, None, Some(dt.as_str()))
                } else {
                    self.ctx.create_literal(&value, None, None)
                }
            }
            TokenKind::Integer(lexical) => self.ctx.create_literal(&lexical, None, Some(xsd::INTEGER)),
            TokenKind::Decimal(lexical) => self.ctx.create_literal(&lexical, None, Some(xsd::DECIMAL)),
            TokenKind::Double(lexical) => self.ctx.create_literal(&lexical, None, Some(xsd::DOUBLE)),
            TokenKind::KwTrue => self.ctx.create_literal("true", None, Some(xsd::BOOLEAN)),
            TokenKind::KwFalse => self.ctx.create_literal("false", None, Some(xsd::BOOLEAN)),
            other => return Err(self.tokens.raise(format!("expected literal, found {}", other))),
        };
        result.map_err(|e| self.tokens.fail(e))
    }

    // ========================================================================
    // Structured nodes
    // ========================================================================

    /// `[ predicateObjectList? ]` with one fresh anonymous subject.
    fn blank_node_property_list(&mut self) -> Result<Term> {
        self.tokens.expect(&TokenKind::LBracket)?;
        self.enter()?;

        let node = self.ctx.blank_node(None);
        if !self.tokens.check(&TokenKind::RBracket)? {
            self.predicate_object_list(node.clone())?;
        }
        self.tokens.expect(&TokenKind::RBracket)?;

        self.depth -= 1;
        Ok(node)
    }

    /// `( object* )` as a chain of fresh cons cells; `()` is `rdf:nil`.
    fn collection(&mut self) -> Result<Term> {
        if self.tokens.skip_if(&TokenKind::Nil)? {
            return Ok(Term::iri(rdf::NIL));
        }
        self.tokens.expect(&TokenKind::LParen)?;
        if self.tokens.skip_if(&TokenKind::RParen)? {
            return Ok(Term::iri(rdf::NIL));
        }
        self.enter()?;

        let first = Term::iri(rdf::FIRST);
        let rest = Term::iri(rdf::REST);

        let head = self.ctx.blank_node(None);
        let mut cell = head.clone();
        loop {
            let item = self.object()?;
            self.emit(cell.clone(), first.clone(), item)?;

            if self.tokens.skip_if(&TokenKind::RParen)? {
                self.emit(cell, rest, Term::iri(rdf::NIL))?;
                break;
            }
            if self.tokens.eof()? {
                return Err(self.tokens.unexpected("')' to close collection"));
            }
            let next = self.ctx.blank_node(None);
            self.emit(cell, rest.clone(), next.clone())?;
            cell = next;
        }

        self.depth -= 1;
        Ok(head)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.ctx.max_depth() {
            return Err(self.tokens.raise(format!(
                "nesting deeper than {} levels",
                self.ctx.max_depth()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Terms and emission
    // ========================================================================

    /// IRI term from an IRI or prefixed-name token.
    fn iri_term(&mut self, token: &Token) -> Result<Term> {
        let result = match &token.kind {
            TokenKind::Iri(iri) => self.ctx.create_iri(iri),
            TokenKind::PrefixedName { prefix, local } => self.ctx.expand_prefixed(prefix, local),
            TokenKind::PrefixedNameNs(prefix) => self.ctx.expand_prefixed(prefix, ""),
            other => return Err(self.tokens.raise(format!("expected IRI, found {}", other))),
        };
        result.map_err(|e| self.tokens.fail(e.at(token.position)))
    }

    fn emit(&mut self, s: Term, p: Term, o: Term) -> Result<()> {
        match self.dialect {
            Dialect::Turtle => {
                let triple = self
                    .ctx
                    .create_triple(s, p, o)
                    .map_err(|e| self.tokens.fail(e))?;
                self.sink.on_triple(triple)?;
            }
            Dialect::TriG => {
                let graph = self.ctx.current_graph().clone();
                let quad = self
                    .ctx
                    .create_quad(graph, s, p, o)
                    .map_err(|e| self.tokens.fail(e))?;
                self.sink.on_quad(quad)?;
            }
        }
        self.emitted += 1;
        Ok(())
    }
}
