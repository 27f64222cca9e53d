//! Line-oriented writers for N-Triples, N-Quads and TriG.
//!
//! Output is deliberately plain: full IRIs, double-quoted escaped literals
//! and one statement per line, so any of the brook grammars can read it back.
//! Blank nodes are written with [`encode_label`], which keeps arbitrary
//! allocator identities syntactically valid and lets a label-encoded
//! allocator restore them exactly.

use crate::label::encode_label;
use crate::term::escape_string;
use crate::{Dataset, GraphName, Quad, Term, Triple};

/// Render a term in N-Triples syntax.
pub fn term_to_ntriples(term: &Term) -> String {
    match term {
        Term::Iri(iri) => format!("<{}>", iri),
        Term::BlankNode(id) => format!("_:{}", encode_label(id)),
        Term::Literal {
            lexical,
            language,
            datatype,
        } => {
            let mut out = format!("\"{}\"", escape_string(lexical));
            if let Some(lang) = language {
                out.push('@');
                out.push_str(lang);
            } else if let Some(dt) = datatype {
                out.push_str("^^<");
                out.push_str(dt);
                out.push('>');
            }
            out
        }
    }
}

fn push_triple_line(out: &mut String, t: &Triple) {
    out.push_str(&term_to_ntriples(&t.s));
    out.push(' ');
    out.push_str(&term_to_ntriples(&t.p));
    out.push(' ');
    out.push_str(&term_to_ntriples(&t.o));
    out.push_str(" .\n");
}

/// Write triples as an N-Triples document.
pub fn write_ntriples<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> String {
    let mut out = String::new();
    for t in triples {
        push_triple_line(&mut out, t);
    }
    out
}

/// Write quads as an N-Quads document.
pub fn write_nquads<'a>(quads: impl IntoIterator<Item = &'a Quad>) -> String {
    let mut out = String::new();
    for q in quads {
        out.push_str(&term_to_ntriples(&q.s));
        out.push(' ');
        out.push_str(&term_to_ntriples(&q.p));
        out.push(' ');
        out.push_str(&term_to_ntriples(&q.o));
        if let GraphName::Named(g) = &q.g {
            out.push(' ');
            out.push_str(&term_to_ntriples(g));
        }
        out.push_str(" .\n");
    }
    out
}

/// Write a dataset as TriG.
///
/// Triples and default-graph quads go to top level; every named graph gets
/// one `{ ... }` block holding its quads in emission order.
pub fn write_trig(dataset: &Dataset) -> String {
    let mut out = String::new();
    for t in dataset.triples() {
        push_triple_line(&mut out, t);
    }
    for name in dataset.graph_names() {
        match name {
            GraphName::Default => {
                for q in dataset.graph(name) {
                    push_triple_line(&mut out, &q.as_triple());
                }
            }
            GraphName::Named(g) => {
                out.push_str(&term_to_ntriples(g));
                out.push_str(" {\n");
                for q in dataset.graph(name) {
                    out.push_str("    ");
                    push_triple_line(&mut out, &q.as_triple());
                }
                out.push_str("}\n");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlankId;

    #[test]
    fn test_ntriples_line() {
        let t = Triple::new(
            Term::iri("http://example.org/s"),
            Term::iri("http://example.org/p"),
            Term::lang_string("a \"quoted\" word", "en"),
        );
        assert_eq!(
            write_ntriples([&t]),
            "<http://example.org/s> <http://example.org/p> \"a \\\"quoted\\\" word\"@en .\n"
        );
    }

    #[test]
    fn test_blank_nodes_are_label_encoded() {
        let term = Term::blank("~b1");
        let written = term_to_ntriples(&term);
        assert_eq!(written, format!("_:{}", encode_label(&BlankId::new("~b1"))));
    }

    #[test]
    fn test_nquads_default_graph_has_three_terms() {
        let q = Quad::new(
            GraphName::Default,
            Term::iri("http://example.org/s"),
            Term::iri("http://example.org/p"),
            Term::typed("1", "http://www.w3.org/2001/XMLSchema#integer"),
        );
        assert_eq!(
            write_nquads([&q]),
            "<http://example.org/s> <http://example.org/p> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n"
        );
    }

    #[test]
    fn test_trig_groups_named_graphs() {
        let g = GraphName::Named(Term::iri("http://example.org/g"));
        let mut dataset = Dataset::new();
        dataset.add_quad(Quad::new(
            g.clone(),
            Term::iri("http://example.org/s"),
            Term::iri("http://example.org/p"),
            Term::plain("x"),
        ));
        dataset.add_quad(Quad::new(
            g,
            Term::iri("http://example.org/s"),
            Term::iri("http://example.org/p"),
            Term::plain("y"),
        ));
        let trig = write_trig(&dataset);
        assert_eq!(trig.matches('{').count(), 1);
        assert!(trig.starts_with("<http://example.org/g> {\n"));
        assert!(trig.ends_with("}\n"));
    }
}
