//! Parse context: the per-document state and term factory shared by all
//! grammars.
//!
//! The context owns everything a grammar needs besides tokens: base IRI,
//! prefix map, blank-node label mapping, strictness, the graph currently
//! being filled, and the error handler. Term construction goes through it so
//! that IRI resolution, blank-node scoping and strict-mode literal checks
//! happen in one place.

use std::collections::HashMap;
use std::sync::Arc;

use brook_bnode::LabelMapping;
use brook_graph_ir::{GraphName, Quad, Term, TextPosition, Triple};
use brook_vocab::rdf;

use crate::error::{Result, TurtleError};
use crate::handler::{ErrorHandler, LoggingErrorHandler};
use crate::iri;

/// Default bound on `[...]` / `(...)` nesting.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Per-document parsing state and term factory.
pub struct ParseContext {
    base: Option<String>,
    prefixes: HashMap<String, String>,
    labels: LabelMapping,
    strict: bool,
    current_graph: GraphName,
    max_depth: usize,
    error_handler: Arc<dyn ErrorHandler>,
}

impl Default for ParseContext {
    fn default() -> Self {
        Self {
            base: None,
            prefixes: HashMap::new(),
            labels: LabelMapping::default(),
            strict: false,
            current_graph: GraphName::Default,
            max_depth: DEFAULT_MAX_DEPTH,
            error_handler: Arc::new(LoggingErrorHandler),
        }
    }
}

impl std::fmt::Debug for ParseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseContext")
            .field("base", &self.base)
            .field("prefixes", &self.prefixes.len())
            .field("labels", &self.labels)
            .field("strict", &self.strict)
            .field("current_graph", &self.current_graph)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a base IRI, used until the document declares its own.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Use a specific blank-node label mapping (owned or shared).
    pub fn with_labels(mut self, labels: impl Into<LabelMapping>) -> Self {
        self.labels = labels.into();
        self
    }

    pub fn with_error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = handler;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Set the base IRI, resolved against the current one.
    ///
    /// Returns the resolved IRI.
    pub fn set_base(&mut self, base: &str) -> Result<String> {
        let resolved = self.resolve_iri(base)?;
        self.base = Some(resolved.clone());
        Ok(resolved)
    }

    /// Bind a prefix; the namespace is resolved against the base.
    ///
    /// Returns the resolved namespace IRI.
    pub fn add_prefix(&mut self, prefix: &str, namespace: &str) -> Result<String> {
        let resolved = self.resolve_iri(namespace)?;
        self.prefixes.insert(prefix.to_string(), resolved.clone());
        Ok(resolved)
    }

    pub fn prefix(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    pub fn prefixes(&self) -> &HashMap<String, String> {
        &self.prefixes
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn error_handler(&self) -> &Arc<dyn ErrorHandler> {
        &self.error_handler
    }

    /// The blank-node label mapping
    pub fn allocator(&mut self) -> &mut LabelMapping {
        &mut self.labels
    }

    /// Graph that statements are currently emitted into; also the scope for
    /// blank-node labels.
    pub fn current_graph(&self) -> &GraphName {
        &self.current_graph
    }

    pub fn set_current_graph(&mut self, graph: GraphName) {
        self.current_graph = graph;
    }

    // ------------------------------------------------------------------
    // Term factory
    // ------------------------------------------------------------------

    /// Resolve a possibly relative IRI against the base.
    pub fn resolve_iri(&self, reference: &str) -> Result<String> {
        iri::resolve(self.base.as_deref(), reference)
    }

    /// IRI term from an IRI reference.
    pub fn create_iri(&self, reference: &str) -> Result<Term> {
        Ok(Term::iri(self.resolve_iri(reference)?))
    }

    /// IRI term from a prefixed name.
    pub fn expand_prefixed(&self, prefix: &str, local: &str) -> Result<Term> {
        match self.prefixes.get(prefix) {
            Some(namespace) => Ok(Term::iri(format!("{}{}", namespace, local))),
            None => Err(TurtleError::undefined_prefix(TextPosition::UNKNOWN, prefix)),
        }
    }

    /// Blank node in `scope`: labelled nodes go through the label mapping,
    /// anonymous ones are always fresh.
    pub fn create_blank_node(&mut self, scope: &GraphName, label: Option<&str>) -> Term {
        let id = match label {
            Some(label) => self.labels.get(scope, label),
            None => self.labels.create(scope),
        };
        Term::BlankNode(id)
    }

    /// Blank node scoped to the current graph.
    pub fn blank_node(&mut self, label: Option<&str>) -> Term {
        let scope = self.current_graph.clone();
        self.create_blank_node(&scope, label)
    }

    /// Literal term.
    ///
    /// In strict mode malformed language tags and `rdf:langString` without a
    /// language are rejected; lenient mode keeps what was written.
    pub fn create_literal(
        &self,
        lexical: &str,
        language: Option<&str>,
        datatype: Option<&str>,
    ) -> Result<Term> {
        match (language, datatype) {
            (Some(_), Some(_)) => Err(TurtleError::term(
                TextPosition::UNKNOWN,
                "literal cannot have both a language tag and a datatype",
            )),
            (Some(lang), None) => {
                if self.strict && !is_valid_lang_tag(lang) {
                    return Err(TurtleError::term(
                        TextPosition::UNKNOWN,
                        format!("malformed language tag '@{}'", lang),
                    ));
                }
                Ok(Term::lang_string(lexical, lang))
            }
            (None, Some(dt)) => {
                if self.strict && dt == rdf::LANG_STRING {
                    return Err(TurtleError::term(
                        TextPosition::UNKNOWN,
                        "rdf:langString literal requires a language tag",
                    ));
                }
                Ok(Term::typed(lexical, dt))
            }
            (None, None) => Ok(Term::plain(lexical)),
        }
    }

    /// Triple, checking each term against its position.
    pub fn create_triple(&self, s: Term, p: Term, o: Term) -> Result<Triple> {
        check_subject(&s)?;
        check_predicate(&p)?;
        Ok(Triple::new(s, p, o))
    }

    /// Quad, checking each term against its position.
    pub fn create_quad(&self, g: GraphName, s: Term, p: Term, o: Term) -> Result<Quad> {
        if let GraphName::Named(name) = &g {
            if !name.is_resource() {
                return Err(TurtleError::term(
                    TextPosition::UNKNOWN,
                    format!("graph name must be an IRI or blank node, found {}", name),
                ));
            }
        }
        check_subject(&s)?;
        check_predicate(&p)?;
        Ok(Quad::new(g, s, p, o))
    }
}

fn check_subject(s: &Term) -> Result<()> {
    if s.is_resource() {
        Ok(())
    } else {
        Err(TurtleError::term(
            TextPosition::UNKNOWN,
            format!("subject must be an IRI or blank node, found {}", s),
        ))
    }
}

fn check_predicate(p: &Term) -> Result<()> {
    if p.is_iri() {
        Ok(())
    } else {
        Err(TurtleError::term(
            TextPosition::UNKNOWN,
            format!("predicate must be an IRI, found {}", p),
        ))
    }
}

/// `[a-zA-Z]{1,8} ('-' [a-zA-Z0-9]{1,8})*`
fn is_valid_lang_tag(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let primary_ok = parts
        .next()
        .is_some_and(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphabetic()));
    primary_ok && parts.all(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use brook_bnode::{AllocStrategy, LabelToNode, ScopePolicy};

    #[test]
    fn test_prefix_namespace_resolves_against_base() {
        let mut ctx = ParseContext::new().with_base("http://example.org/dir/");
        assert_eq!(
            ctx.add_prefix("ex", "vocab#").unwrap(),
            "http://example.org/dir/vocab#"
        );
        assert_eq!(
            ctx.expand_prefixed("ex", "name").unwrap(),
            Term::iri("http://example.org/dir/vocab#name")
        );
    }

    #[test]
    fn test_undefined_prefix() {
        let ctx = ParseContext::new();
        let err = ctx.expand_prefixed("nope", "x").unwrap_err();
        assert!(matches!(err, TurtleError::UndefinedPrefix { prefix, .. } if prefix == "nope"));
    }

    #[test]
    fn test_set_base_is_relative_to_previous_base() {
        let mut ctx = ParseContext::new().with_base("http://example.org/a/");
        assert_eq!(ctx.set_base("b/").unwrap(), "http://example.org/a/b/");
        assert_eq!(ctx.base(), Some("http://example.org/a/b/"));
    }

    #[test]
    fn test_lang_tag_checks_only_in_strict_mode() {
        let lenient = ParseContext::new();
        assert!(lenient.create_literal("x", Some("en--"), None).is_ok());

        let strict = ParseContext::new().with_strict(true);
        assert!(strict.create_literal("x", Some("en--"), None).is_err());
        assert!(strict.create_literal("x", Some("en-US"), None).is_ok());
    }

    #[test]
    fn test_lang_string_without_language() {
        let strict = ParseContext::new().with_strict(true);
        assert!(strict.create_literal("x", None, Some(rdf::LANG_STRING)).is_err());
        assert!(ParseContext::new()
            .create_literal("x", None, Some(rdf::LANG_STRING))
            .is_ok());
    }

    #[test]
    fn test_position_checks() {
        let ctx = ParseContext::new();
        let iri = Term::iri("http://example.org/x");
        assert!(ctx
            .create_triple(Term::plain("s"), iri.clone(), iri.clone())
            .is_err());
        assert!(ctx
            .create_triple(iri.clone(), Term::blank("p"), iri.clone())
            .is_err());
        assert!(ctx
            .create_quad(
                GraphName::Named(Term::plain("g")),
                iri.clone(),
                iri.clone(),
                iri.clone()
            )
            .is_err());
        assert!(ctx
            .create_triple(Term::blank("s"), iri.clone(), Term::plain("o"))
            .is_ok());
    }

    #[test]
    fn test_blank_nodes_follow_current_graph_scope() {
        let labels = LabelToNode::new(ScopePolicy::PerGraph, AllocStrategy::Counter).unwrap();
        let mut ctx = ParseContext::new().with_labels(labels);

        let in_default = ctx.blank_node(Some("b"));
        ctx.set_current_graph(GraphName::Named(Term::iri("http://example.org/g")));
        let in_named = ctx.blank_node(Some("b"));

        assert_ne!(in_default, in_named);
        assert_eq!(ctx.blank_node(Some("b")), in_named);
        assert_ne!(ctx.blank_node(None), ctx.blank_node(None));
    }
}
