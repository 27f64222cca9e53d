//! RDF term types: IRI, blank node, and literal
//!
//! Terms are the building blocks of statements. A term can be:
//! - An IRI (always resolved and expanded, never prefixed)
//! - A blank node (opaque identity chosen by a blank-node allocator)
//! - A literal (lexical form + optional language tag + optional datatype IRI)

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// Blank node identity
///
/// The string is whatever the active allocator produced: a zero-padded
/// counter, a truncated digest, or the label as written. Two blank-node terms
/// denote the same node only when their identities are equal, which within a
/// parse run means they came from the same allocation path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankId(Arc<str>);

impl BlankId {
    /// Create a blank node identity from a string
    ///
    /// The string should NOT include the `_:` prefix.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Get the identity string (without `_:` prefix)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlankId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// An RDF term (graph, subject, predicate, or object position)
///
/// # Invariants
///
/// - `Term::Iri` always contains a resolved IRI, never a prefixed form.
/// - A `Term::Literal` never carries both a language tag and a datatype.
///   Language-tagged literals are implicitly `rdf:langString`; literals with
///   neither are simple literals (`xsd:string`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Full IRI (e.g., "http://schema.org/Person")
    Iri(Arc<str>),

    /// Blank node with allocator-chosen identity
    BlankNode(BlankId),

    /// Literal value
    Literal {
        /// Lexical form, unescaped
        lexical: Arc<str>,
        /// Language tag (without `@`)
        language: Option<Arc<str>>,
        /// Datatype IRI
        datatype: Option<Arc<str>>,
    },
}

impl Term {
    /// Create an IRI term
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    /// Create a blank node term
    pub fn blank(id: impl AsRef<str>) -> Self {
        Term::BlankNode(BlankId::new(id))
    }

    /// Create a simple literal (no language, no datatype)
    pub fn plain(lexical: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            language: None,
            datatype: None,
        }
    }

    /// Create a language-tagged literal
    pub fn lang_string(lexical: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            language: Some(Arc::from(lang.as_ref())),
            datatype: None,
        }
    }

    /// Create a typed literal
    pub fn typed(lexical: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            language: None,
            datatype: Some(Arc::from(datatype.as_ref())),
        }
    }

    /// Check if this is an IRI term
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    /// Check if this is a blank node
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// Try to get as IRI string
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Try to get as blank node ID
    pub fn as_blank(&self) -> Option<&BlankId> {
        match self {
            Term::BlankNode(id) => Some(id),
            _ => None,
        }
    }

    /// Try to get literal components: (lexical, language, datatype)
    pub fn as_literal(&self) -> Option<(&str, Option<&str>, Option<&str>)> {
        match self {
            Term::Literal {
                lexical,
                language,
                datatype,
            } => Some((lexical, language.as_deref(), datatype.as_deref())),
            _ => None,
        }
    }

    /// Whether this term may stand in subject or graph-name position.
    pub fn is_resource(&self) -> bool {
        matches!(self, Term::Iri(_) | Term::BlankNode(_))
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        // Type ordering: BlankNode < Iri < Literal
        let type_ord = |t: &Term| -> u8 {
            match t {
                Term::BlankNode(_) => 0,
                Term::Iri(_) => 1,
                Term::Literal { .. } => 2,
            }
        };

        match type_ord(self).cmp(&type_ord(other)) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match (self, other) {
            (Term::Iri(a), Term::Iri(b)) => a.cmp(b),
            (Term::BlankNode(a), Term::BlankNode(b)) => a.cmp(b),
            (
                Term::Literal {
                    lexical: v1,
                    language: l1,
                    datatype: d1,
                },
                Term::Literal {
                    lexical: v2,
                    language: l2,
                    datatype: d2,
                },
            ) => (d1, l1, v1).cmp(&(d2, l2, v2)),
            _ => Ordering::Equal,
        }
    }
}

/// Escape a lexical form for a double-quoted N-Triples / Turtle string.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            c => out.push(c),
        }
    }
    out
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(id) => write!(f, "{}", id),
            Term::Literal {
                lexical,
                language,
                datatype,
            } => {
                write!(f, "\"{}\"", escape_string(lexical))?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{}>", dt)
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_id() {
        let id = BlankId::new("b0");
        assert_eq!(id.as_str(), "b0");
        assert_eq!(format!("{}", id), "_:b0");
    }

    #[test]
    fn test_term_constructors() {
        let iri = Term::iri("http://example.org/foo");
        assert!(iri.is_iri());
        assert!(iri.is_resource());
        assert_eq!(iri.as_iri(), Some("http://example.org/foo"));

        let blank = Term::blank("b0");
        assert!(blank.is_blank());
        assert!(blank.is_resource());

        let lang = Term::lang_string("bonjour", "fr");
        assert!(lang.is_literal());
        assert!(!lang.is_resource());
        assert_eq!(lang.as_literal(), Some(("bonjour", Some("fr"), None)));
    }

    #[test]
    fn test_term_ordering() {
        // Blank nodes < IRIs < Literals
        let blank = Term::blank("b0");
        let iri = Term::iri("http://example.org");
        let lit = Term::plain("hello");

        assert!(blank < iri);
        assert!(iri < lit);

        let iri_a = Term::iri("http://a.org");
        let iri_b = Term::iri("http://b.org");
        assert!(iri_a < iri_b);
    }

    #[test]
    fn test_term_display() {
        assert_eq!(
            format!("{}", Term::iri("http://example.org")),
            "<http://example.org>"
        );
        assert_eq!(format!("{}", Term::blank("b0")), "_:b0");
        assert_eq!(format!("{}", Term::plain("say \"hi\"\n")), "\"say \\\"hi\\\"\\n\"");
        assert_eq!(
            format!("{}", Term::lang_string("bonjour", "fr")),
            "\"bonjour\"@fr"
        );
        assert_eq!(
            format!("{}", Term::typed("42", "http://www.w3.org/2001/XMLSchema#integer")),
            "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }
}
