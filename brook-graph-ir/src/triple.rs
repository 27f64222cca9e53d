//! Statements: triples, quads and graph names

use crate::Term;
use serde::{Deserialize, Serialize};

/// The graph a quad belongs to.
///
/// `Default` is the unnamed default graph; `Named` holds an IRI or blank node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GraphName {
    /// The default graph
    Default,
    /// A named graph (IRI or blank node)
    Named(Term),
}

impl GraphName {
    /// Check if this is the default graph
    pub fn is_default(&self) -> bool {
        matches!(self, GraphName::Default)
    }

    /// The graph term, if named
    pub fn as_term(&self) -> Option<&Term> {
        match self {
            GraphName::Default => None,
            GraphName::Named(t) => Some(t),
        }
    }
}

impl From<Term> for GraphName {
    fn from(term: Term) -> Self {
        GraphName::Named(term)
    }
}

impl std::fmt::Display for GraphName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphName::Default => write!(f, "DEFAULT"),
            GraphName::Named(t) => write!(f, "{}", t),
        }
    }
}

/// An RDF triple
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    /// Subject (IRI or blank node)
    pub s: Term,
    /// Predicate (IRI)
    pub p: Term,
    /// Object (any term)
    pub o: Term,
}

impl Triple {
    /// Create a new triple
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o }
    }

    /// Place this triple in a graph
    pub fn in_graph(self, g: GraphName) -> Quad {
        Quad {
            g,
            s: self.s,
            p: self.p,
            o: self.o,
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} .", self.s, self.p, self.o)
    }
}

/// An RDF quad
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quad {
    /// Graph name
    pub g: GraphName,
    /// Subject (IRI or blank node)
    pub s: Term,
    /// Predicate (IRI)
    pub p: Term,
    /// Object (any term)
    pub o: Term,
}

impl Quad {
    /// Create a new quad
    pub fn new(g: GraphName, s: Term, p: Term, o: Term) -> Self {
        Self { g, s, p, o }
    }

    /// The triple part of this quad
    pub fn as_triple(&self) -> Triple {
        Triple::new(self.s.clone(), self.p.clone(), self.o.clone())
    }

    /// Check whether the quad is in the default graph
    pub fn is_default_graph(&self) -> bool {
        self.g.is_default()
    }
}

impl std::fmt::Display for Quad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.g {
            GraphName::Default => write!(f, "{} {} {} .", self.s, self.p, self.o),
            GraphName::Named(g) => write!(f, "{} {} {} {} .", self.s, self.p, self.o, g),
        }
    }
}
