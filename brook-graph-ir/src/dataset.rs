//! RDF dataset - the triples and quads of one parse, plus its prologue
//!
//! The `Dataset` type uses `Vec` storage to preserve duplicates (bag
//! semantics), matching what the parser actually emitted.

use crate::{BlankId, GraphName, Quad, Term, Triple};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A collection of RDF triples and quads
///
/// # Design Decisions
///
/// - **Vec storage**: statements are kept in emission order, duplicates included.
/// - **Separate kinds**: Turtle and N-Triples produce triples, TriG and
///   N-Quads produce quads; both are kept as they were delivered.
/// - **Structural comparison**: `canonicalize()` relabels blank nodes from
///   their surrounding statements and sorts, so two parses of equivalent
///   documents compare equal regardless of statement order or of the
///   allocator that produced the blank-node identities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    triples: Vec<Triple>,
    quads: Vec<Quad>,
    /// Base IRI from parsing
    pub base: Option<String>,
    /// Prefix mappings from parsing (deterministic order via BTreeMap)
    pub prefixes: BTreeMap<String, String>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base IRI
    pub fn set_base(&mut self, base: impl Into<String>) {
        self.base = Some(base.into());
    }

    /// Add a prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Add a triple
    pub fn add_triple(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    /// Add a quad
    pub fn add_quad(&mut self, quad: Quad) {
        self.quads.push(quad);
    }

    /// The triples, in emission order
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// The quads, in emission order
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    /// Total number of statements
    pub fn len(&self) -> usize {
        self.triples.len() + self.quads.len()
    }

    /// Check if the dataset holds no statements
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty() && self.quads.is_empty()
    }

    /// Quads belonging to one graph
    pub fn graph<'a>(&'a self, name: &'a GraphName) -> impl Iterator<Item = &'a Quad> + 'a {
        self.quads.iter().filter(move |q| &q.g == name)
    }

    /// Distinct graph names in first-seen order
    pub fn graph_names(&self) -> Vec<&GraphName> {
        let mut names: Vec<&GraphName> = Vec::new();
        for q in &self.quads {
            if !names.contains(&&q.g) {
                names.push(&q.g);
            }
        }
        names
    }

    /// All distinct blank-node identities
    pub fn blank_nodes(&self) -> Vec<&BlankId> {
        let mut ids: Vec<&BlankId> = self
            .triples
            .iter()
            .flat_map(|t| [&t.s, &t.p, &t.o])
            .chain(self.quads.iter().flat_map(|q| {
                [q.g.as_term(), Some(&q.s), Some(&q.p), Some(&q.o)]
                    .into_iter()
                    .flatten()
            }))
            .filter_map(Term::as_blank)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Consume into (triples, quads)
    pub fn into_parts(self) -> (Vec<Triple>, Vec<Quad>) {
        (self.triples, self.quads)
    }

    /// Relabel blank nodes from the shape of the statements around them,
    /// then sort.
    ///
    /// Labels come from iterated neighbourhood refinement, so they do not
    /// depend on statement order or on the identities an allocator happened
    /// to choose. Nodes that refinement cannot tell apart are split by
    /// picking one; for graphs with such ties only
    /// [`Dataset::isomorphic_statements`] is exact. Prefixes and base are
    /// left untouched.
    pub fn canonicalize(&mut self) {
        let labels = {
            let shapes = Shapes::new(self);
            let mut colors = shapes.refined();
            while let Some(tied) = shapes.tied(&colors) {
                colors = shapes.individualize(&colors, tied[0]);
            }
            Shapes::labels(&colors)
        };
        self.relabel(&labels);
    }

    /// A canonicalized copy (see [`Dataset::canonicalize`])
    pub fn canonical(&self) -> Dataset {
        let mut copy = self.clone();
        copy.canonicalize();
        copy
    }

    /// Compare statements structurally, ignoring blank-node identities,
    /// statement order, base and prefixes.
    ///
    /// Exact: where refinement leaves ties, every way of splitting them on
    /// `other` is tried against the canonical form of `self`.
    pub fn isomorphic_statements(&self, other: &Dataset) -> bool {
        if self.triples.len() != other.triples.len() || self.quads.len() != other.quads.len() {
            return false;
        }
        let target = self.canonical();
        let shapes = Shapes::new(other);
        shapes.search(shapes.refined(), &target)
    }

    fn relabel(&mut self, labels: &HashMap<BlankId, BlankId>) {
        let relabel = |term: &mut Term| {
            if let Term::BlankNode(id) = term {
                if let Some(label) = labels.get(&*id) {
                    *id = label.clone();
                }
            }
        };
        for t in &mut self.triples {
            relabel(&mut t.s);
            relabel(&mut t.p);
            relabel(&mut t.o);
        }
        for q in &mut self.quads {
            if let GraphName::Named(g) = &mut q.g {
                relabel(g);
            }
            relabel(&mut q.s);
            relabel(&mut q.p);
            relabel(&mut q.o);
        }
        self.triples.sort();
        self.quads.sort();
    }
}

/// Blank node to color class
type Colors<'a> = BTreeMap<&'a BlankId, usize>;

/// Statements flattened to term slots, for coloring blank nodes.
struct Shapes<'a> {
    dataset: &'a Dataset,
    /// `'t'` or `'q'`, then the slots (graph first for quads, `None` for the
    /// default graph)
    statements: Vec<(char, Vec<Option<&'a Term>>)>,
}

impl<'a> Shapes<'a> {
    fn new(dataset: &'a Dataset) -> Self {
        let triples = dataset
            .triples
            .iter()
            .map(|t| ('t', vec![Some(&t.s), Some(&t.p), Some(&t.o)]));
        let quads = dataset
            .quads
            .iter()
            .map(|q| ('q', vec![q.g.as_term(), Some(&q.s), Some(&q.p), Some(&q.o)]));
        Self {
            dataset,
            statements: triples.chain(quads).collect(),
        }
    }

    /// Every blank node in one class, refined.
    fn refined(&self) -> Colors<'a> {
        let mut colors: Colors<'a> = self
            .statements
            .iter()
            .flat_map(|(_, slots)| slots.iter().copied().flatten())
            .filter_map(Term::as_blank)
            .map(|id| (id, 0))
            .collect();
        self.refine(&mut colors);
        colors
    }

    fn class_count(colors: &Colors<'_>) -> usize {
        colors.values().collect::<BTreeSet<_>>().len()
    }

    /// Split classes by the statements each node takes part in, until the
    /// partition stops splitting.
    fn refine(&self, colors: &mut Colors<'a>) {
        let mut classes = Self::class_count(colors);
        loop {
            let mut shapes: BTreeMap<&'a BlankId, Vec<String>> =
                colors.keys().map(|id| (*id, Vec::new())).collect();
            for (kind, slots) in &self.statements {
                for id in slots.iter().copied().flatten().filter_map(Term::as_blank) {
                    let shape = Self::render(*kind, slots, id, colors);
                    if let Some(list) = shapes.get_mut(id) {
                        list.push(shape);
                    }
                }
            }

            let signatures: BTreeMap<&'a BlankId, String> = shapes
                .into_iter()
                .map(|(id, mut list)| {
                    list.sort();
                    (id, format!("{}|{}", colors[id], list.join("\n")))
                })
                .collect();
            let ranks: HashMap<&String, usize> = signatures
                .values()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .enumerate()
                .map(|(rank, signature)| (signature, rank))
                .collect();
            *colors = signatures
                .iter()
                .map(|(id, signature)| (*id, ranks[signature]))
                .collect();

            let next = Self::class_count(colors);
            if next == classes {
                return;
            }
            classes = next;
        }
    }

    /// One statement as seen from `me`: other blank nodes by class.
    fn render(kind: char, slots: &[Option<&Term>], me: &BlankId, colors: &Colors<'_>) -> String {
        let mut out = String::from(kind);
        for slot in slots {
            out.push(' ');
            match slot {
                None => out.push('-'),
                Some(Term::BlankNode(id)) if id == me => out.push('*'),
                Some(Term::BlankNode(id)) => {
                    out.push_str(&format!("_:{}", colors.get(id).copied().unwrap_or(0)))
                }
                Some(term) => out.push_str(&term.to_string()),
            }
        }
        out
    }

    /// Members of the lowest class that still holds more than one node.
    fn tied(&self, colors: &Colors<'a>) -> Option<Vec<&'a BlankId>> {
        let mut classes: BTreeMap<usize, Vec<&'a BlankId>> = BTreeMap::new();
        for (id, color) in colors {
            classes.entry(*color).or_default().push(*id);
        }
        classes.into_values().find(|members| members.len() > 1)
    }

    /// Give `id` a class of its own and refine again.
    fn individualize(&self, colors: &Colors<'a>, id: &'a BlankId) -> Colors<'a> {
        let mut next = colors.clone();
        next.insert(id, colors.len());
        self.refine(&mut next);
        next
    }

    /// Try every way of breaking ties until one matches `target`.
    fn search(&self, colors: Colors<'a>, target: &Dataset) -> bool {
        match self.tied(&colors) {
            None => {
                let mut candidate = self.dataset.clone();
                candidate.relabel(&Self::labels(&colors));
                candidate.triples == target.triples && candidate.quads == target.quads
            }
            Some(tied) => tied
                .into_iter()
                .any(|id| self.search(self.individualize(&colors, id), target)),
        }
    }

    fn labels(colors: &Colors<'_>) -> HashMap<BlankId, BlankId> {
        colors
            .iter()
            .map(|(id, color)| ((*id).clone(), BlankId::new(format!("c{}", color))))
            .collect()
    }
}

impl Extend<Triple> for Dataset {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        self.triples.extend(iter);
    }
}

impl Extend<Quad> for Dataset {
    fn extend<T: IntoIterator<Item = Quad>>(&mut self, iter: T) {
        self.quads.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(local: &str) -> Term {
        Term::iri(format!("http://example.org/{}", local))
    }

    #[test]
    fn test_dataset_creation() {
        let dataset = Dataset::new();
        assert!(dataset.is_empty());
        assert_eq!(dataset.len(), 0);
    }

    #[test]
    fn test_canonicalize_ignores_blank_identities() {
        let mut a = Dataset::new();
        a.add_triple(Triple::new(Term::blank("x9"), p("p"), Term::plain("1")));
        a.add_triple(Triple::new(Term::blank("x9"), p("q"), Term::blank("y2")));

        let mut b = Dataset::new();
        b.add_triple(Triple::new(Term::blank("0001"), p("p"), Term::plain("1")));
        b.add_triple(Triple::new(Term::blank("0001"), p("q"), Term::blank("0002")));

        assert!(a.isomorphic_statements(&b));
    }

    #[test]
    fn test_canonicalize_keeps_sharing_structure() {
        let mut a = Dataset::new();
        a.add_triple(Triple::new(Term::blank("x"), p("p"), Term::blank("x")));

        let mut b = Dataset::new();
        b.add_triple(Triple::new(Term::blank("x"), p("p"), Term::blank("y")));

        assert!(!a.isomorphic_statements(&b));
    }

    #[test]
    fn test_isomorphism_ignores_statement_order() {
        let mut a = Dataset::new();
        a.add_triple(Triple::new(Term::blank("x"), p("p"), Term::plain("1")));
        a.add_triple(Triple::new(Term::blank("y"), p("p"), Term::plain("2")));

        let mut b = Dataset::new();
        b.add_triple(Triple::new(Term::blank("y"), p("p"), Term::plain("2")));
        b.add_triple(Triple::new(Term::blank("x"), p("p"), Term::plain("1")));

        assert!(a.isomorphic_statements(&b));
        assert_eq!(a.canonical().triples(), b.canonical().triples());
    }

    #[test]
    fn test_isomorphism_with_symmetric_blank_nodes() {
        let mut a = Dataset::new();
        a.add_triple(Triple::new(Term::blank("a"), p("knows"), Term::blank("b")));
        a.add_triple(Triple::new(Term::blank("b"), p("knows"), Term::blank("a")));
        a.add_quad(Quad::new(
            GraphName::Named(Term::blank("g")),
            Term::blank("a"),
            p("in"),
            p("o"),
        ));

        let mut b = Dataset::new();
        b.add_quad(Quad::new(
            GraphName::Named(Term::blank("h")),
            Term::blank("m"),
            p("in"),
            p("o"),
        ));
        b.add_triple(Triple::new(Term::blank("n"), p("knows"), Term::blank("m")));
        b.add_triple(Triple::new(Term::blank("m"), p("knows"), Term::blank("n")));

        assert!(a.isomorphic_statements(&b));

        let mut c = Dataset::new();
        c.add_triple(Triple::new(Term::blank("a"), p("knows"), Term::blank("b")));
        c.add_triple(Triple::new(Term::blank("b"), p("knows"), Term::blank("a")));
        c.add_quad(Quad::new(
            GraphName::Named(Term::blank("g")),
            Term::blank("g"),
            p("in"),
            p("o"),
        ));
        assert!(!a.isomorphic_statements(&c));
    }

    #[test]
    fn test_isomorphism_breaks_ties_by_search() {
        // Two disjoint two-cycles against one four-cycle: refinement alone
        // cannot separate them.
        let cycle = |pairs: &[(&str, &str)]| {
            let mut dataset = Dataset::new();
            for (s, o) in pairs {
                dataset.add_triple(Triple::new(Term::blank(*s), p("next"), Term::blank(*o)));
            }
            dataset
        };
        let two_cycles = cycle(&[("a", "b"), ("b", "a"), ("c", "d"), ("d", "c")]);
        let four_cycle = cycle(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")]);
        let shuffled = cycle(&[("w", "x"), ("y", "z"), ("x", "w"), ("z", "y")]);

        assert!(!two_cycles.isomorphic_statements(&four_cycle));
        assert!(two_cycles.isomorphic_statements(&shuffled));
        assert!(shuffled.isomorphic_statements(&two_cycles));
    }

    #[test]
    fn test_graph_names_and_filter() {
        let g1 = GraphName::Named(p("g1"));
        let mut dataset = Dataset::new();
        dataset.add_quad(Quad::new(g1.clone(), p("s"), p("p"), p("o")));
        dataset.add_quad(Quad::new(GraphName::Default, p("s"), p("p"), p("o")));
        dataset.add_quad(Quad::new(g1.clone(), p("s2"), p("p"), p("o")));

        assert_eq!(dataset.graph_names(), vec![&g1, &GraphName::Default]);
        assert_eq!(dataset.graph(&g1).count(), 2);
    }

    #[test]
    fn test_blank_nodes_collects_graph_position() {
        let mut dataset = Dataset::new();
        dataset.add_quad(Quad::new(
            GraphName::Named(Term::blank("g")),
            Term::blank("s"),
            p("p"),
            p("o"),
        ));
        let ids: Vec<&str> = dataset.blank_nodes().iter().map(|b| b.as_str()).collect();
        assert_eq!(ids, vec!["g", "s"]);
    }
}
