//! The allocator contract and the closed set of allocation strategies.

use std::collections::HashMap;

use brook_graph_ir::label::decode_label;
use brook_graph_ir::{BlankId, GraphName};
use serde::{Deserialize, Serialize};

use crate::error::{AllocError, Result};
use crate::hash::{HashAllocator, DEFAULT_CACHE_SIZE};

/// Maps syntactic blank-node labels to node identities.
///
/// # Contract
///
/// - `alloc(label)` is idempotent until the next `reset()`.
/// - `create()` returns a fresh identity that is distinct from every other
///   `create()` result and from every identity `alloc()` can return.
/// - `reset()` drops all history; identities before and after a reset are
///   unrelated.
pub trait NodeAllocator {
    /// Identity for a labelled node
    fn alloc(&mut self, label: &str) -> BlankId;

    /// Identity for an anonymous node
    fn create(&mut self) -> BlankId;

    /// Forget everything allocated so far
    fn reset(&mut self);
}

/// Prefix for allocator-created identities in strategies whose `alloc()`
/// passes label text through. `~` never occurs in a Turtle label.
const FRESH_PREFIX: char = '~';

// ============================================================================
// Counter
// ============================================================================

/// Sequential zero-padded identities, restarting at every reset.
///
/// Keeps a label table so `alloc` stays idempotent when used directly.
#[derive(Debug, Default)]
pub struct CounterAllocator {
    counter: u64,
    labels: HashMap<String, BlankId>,
}

impl CounterAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> BlankId {
        self.counter += 1;
        BlankId::new(format!("{:08}", self.counter))
    }
}

impl NodeAllocator for CounterAllocator {
    fn alloc(&mut self, label: &str) -> BlankId {
        if let Some(id) = self.labels.get(label) {
            return id.clone();
        }
        let id = self.next_id();
        self.labels.insert(label.to_string(), id.clone());
        id
    }

    fn create(&mut self) -> BlankId {
        self.next_id()
    }

    fn reset(&mut self) {
        self.counter = 0;
        self.labels.clear();
    }
}

// ============================================================================
// Global map
// ============================================================================

/// Full label table with globally unique (random 128-bit) identities.
///
/// Meant to be long-lived and shared across parse runs, so that the same
/// label means the same node in every document fed through it.
#[derive(Debug, Default)]
pub struct MapAllocator {
    labels: HashMap<String, BlankId>,
}

impl MapAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct labels seen
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn random_identity() -> BlankId {
    BlankId::new(format!("{:032x}", rand::random::<u128>()))
}

impl NodeAllocator for MapAllocator {
    fn alloc(&mut self, label: &str) -> BlankId {
        self.labels
            .entry(label.to_string())
            .or_insert_with(random_identity)
            .clone()
    }

    fn create(&mut self) -> BlankId {
        random_identity()
    }

    fn reset(&mut self) {
        self.labels.clear();
    }
}

// ============================================================================
// Label as given
// ============================================================================

/// Uses the label text itself as the identity.
///
/// Handy for debugging since output shows the original labels, but unsafe
/// for round trips: a label written by another allocator may coincide with
/// an unrelated label in the input.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    counter: u64,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeAllocator for LabelAllocator {
    fn alloc(&mut self, label: &str) -> BlankId {
        BlankId::new(label)
    }

    fn create(&mut self) -> BlankId {
        self.counter += 1;
        BlankId::new(format!("{}{}", FRESH_PREFIX, self.counter))
    }

    fn reset(&mut self) {
        self.counter = 0;
    }
}

// ============================================================================
// Label encoded
// ============================================================================

/// Decodes labels written by `brook_graph_ir::label::encode_label`,
/// restoring the identities of a previous run exactly.
///
/// Labels not in the encoded format are used as given.
#[derive(Debug, Default)]
pub struct EncodedLabelAllocator;

impl EncodedLabelAllocator {
    pub fn new() -> Self {
        Self
    }
}

impl NodeAllocator for EncodedLabelAllocator {
    fn alloc(&mut self, label: &str) -> BlankId {
        decode_label(label).unwrap_or_else(|| BlankId::new(label))
    }

    fn create(&mut self) -> BlankId {
        random_identity()
    }

    fn reset(&mut self) {}
}

// ============================================================================
// Strategy selection
// ============================================================================

/// Which identity-derivation algorithm to use.
///
/// | Strategy | Memory | Determinism |
/// |---|---|---|
/// | `Counter` | O(distinct labels) per run | sequential per run |
/// | `GlobalMap` | O(distinct labels) | stable within one long-lived instance |
/// | `RandomHash` | O(cache size) | stable within a run |
/// | `SeededHash` | O(cache size) | stable across runs with the same seed |
/// | `AsGiven` | O(1) | label text preserved; unsafe for round trips |
/// | `LabelEncoded` | O(1) | exact round trip with the brook writers |
///
/// The derivation only applies under [`ScopePolicy::Fixed`] and
/// [`ScopePolicy::PerGraphAllocator`]. The table policies (`Single`,
/// `PerGraph`) replace it: a label's first occurrence takes a `create()`
/// identity, so memory is O(distinct labels) whatever the strategy, and a
/// seeded hash no longer gives label-derived identities.
///
/// [`ScopePolicy::Fixed`]: crate::ScopePolicy::Fixed
/// [`ScopePolicy::PerGraphAllocator`]: crate::ScopePolicy::PerGraphAllocator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AllocStrategy {
    Counter,
    GlobalMap,
    RandomHash {
        #[serde(default = "default_cache_size")]
        cache_size: usize,
    },
    SeededHash {
        seed: String,
        #[serde(default = "default_cache_size")]
        cache_size: usize,
    },
    AsGiven,
    LabelEncoded,
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

impl Default for AllocStrategy {
    fn default() -> Self {
        AllocStrategy::RandomHash {
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl AllocStrategy {
    /// Seeded hash strategy with the default cache size
    pub fn seeded(seed: impl Into<String>) -> Self {
        AllocStrategy::SeededHash {
            seed: seed.into(),
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }

    /// Reject configurations that cannot produce a working allocator.
    pub fn validate(&self) -> Result<()> {
        match self {
            AllocStrategy::RandomHash { cache_size: 0 }
            | AllocStrategy::SeededHash { cache_size: 0, .. } => Err(AllocError::ZeroCacheSize),
            AllocStrategy::SeededHash { seed, .. } if seed.is_empty() => {
                Err(AllocError::EmptySeed)
            }
            _ => Ok(()),
        }
    }

    /// Build an allocator for this strategy.
    pub fn build(&self) -> Allocator {
        match self {
            AllocStrategy::Counter => Allocator::Counter(CounterAllocator::new()),
            AllocStrategy::GlobalMap => Allocator::GlobalMap(MapAllocator::new()),
            AllocStrategy::RandomHash { cache_size } => {
                Allocator::Hash(HashAllocator::random(*cache_size))
            }
            AllocStrategy::SeededHash { seed, cache_size } => {
                Allocator::Hash(HashAllocator::seeded(seed.as_bytes(), *cache_size))
            }
            AllocStrategy::AsGiven => Allocator::AsGiven(LabelAllocator::new()),
            AllocStrategy::LabelEncoded => Allocator::LabelEncoded(EncodedLabelAllocator::new()),
        }
    }

    /// Build an allocator dedicated to one graph.
    ///
    /// A seeded hash gets a per-graph seed derived from the configured seed
    /// and the graph name, so graphs stay isolated while remaining
    /// reproducible. Random hashes already get a fresh seed per instance.
    pub fn build_for_scope(&self, scope: &GraphName) -> Allocator {
        match self {
            AllocStrategy::SeededHash { seed, cache_size } => {
                let mut scoped = seed.as_bytes().to_vec();
                scoped.push(0x00);
                scoped.extend_from_slice(scope.to_string().as_bytes());
                Allocator::Hash(HashAllocator::seeded(scoped, *cache_size))
            }
            other => other.build(),
        }
    }
}

/// A blank-node allocator for one of the supported strategies.
#[derive(Debug)]
pub enum Allocator {
    Counter(CounterAllocator),
    GlobalMap(MapAllocator),
    Hash(HashAllocator),
    AsGiven(LabelAllocator),
    LabelEncoded(EncodedLabelAllocator),
}

impl NodeAllocator for Allocator {
    fn alloc(&mut self, label: &str) -> BlankId {
        match self {
            Allocator::Counter(a) => a.alloc(label),
            Allocator::GlobalMap(a) => a.alloc(label),
            Allocator::Hash(a) => a.alloc(label),
            Allocator::AsGiven(a) => a.alloc(label),
            Allocator::LabelEncoded(a) => a.alloc(label),
        }
    }

    fn create(&mut self) -> BlankId {
        match self {
            Allocator::Counter(a) => a.create(),
            Allocator::GlobalMap(a) => a.create(),
            Allocator::Hash(a) => a.create(),
            Allocator::AsGiven(a) => a.create(),
            Allocator::LabelEncoded(a) => a.create(),
        }
    }

    fn reset(&mut self) {
        match self {
            Allocator::Counter(a) => a.reset(),
            Allocator::GlobalMap(a) => a.reset(),
            Allocator::Hash(a) => a.reset(),
            Allocator::AsGiven(a) => a.reset(),
            Allocator::LabelEncoded(a) => a.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brook_graph_ir::label::encode_label;
    use brook_graph_ir::Term;
    use std::collections::HashSet;

    fn all_strategies() -> Vec<AllocStrategy> {
        vec![
            AllocStrategy::Counter,
            AllocStrategy::GlobalMap,
            AllocStrategy::default(),
            AllocStrategy::seeded("s3cr3t"),
            AllocStrategy::AsGiven,
            AllocStrategy::LabelEncoded,
        ]
    }

    #[test]
    fn test_alloc_is_idempotent_for_every_strategy() {
        for strategy in all_strategies() {
            let mut alloc = strategy.build();
            for label in ["a", "b0", "x.y", "0"] {
                assert_eq!(alloc.alloc(label), alloc.alloc(label), "{:?}", strategy);
            }
        }
    }

    #[test]
    fn test_create_is_fresh_for_every_strategy() {
        for strategy in all_strategies() {
            let mut alloc = strategy.build();
            let labelled: HashSet<BlankId> =
                ["a", "b", "00000001", "c9"].iter().map(|l| alloc.alloc(l)).collect();
            let c1 = alloc.create();
            let c2 = alloc.create();
            assert_ne!(c1, c2, "{:?}", strategy);
            assert!(!labelled.contains(&c1), "{:?}", strategy);
            assert!(!labelled.contains(&c2), "{:?}", strategy);
        }
    }

    #[test]
    fn test_counter_is_zero_padded_and_restarts() {
        let mut alloc = CounterAllocator::new();
        assert_eq!(alloc.create().as_str(), "00000001");
        assert_eq!(alloc.alloc("a").as_str(), "00000002");
        alloc.reset();
        assert_eq!(alloc.create().as_str(), "00000001");
    }

    #[test]
    fn test_label_as_given_preserves_text() {
        let mut alloc = LabelAllocator::new();
        assert_eq!(alloc.alloc("alice").as_str(), "alice");
    }

    #[test]
    fn test_label_encoded_restores_identity() {
        let original = BlankId::new("3f2a9c");
        let mut alloc = EncodedLabelAllocator::new();
        assert_eq!(alloc.alloc(&encode_label(&original)), original);
        assert_eq!(alloc.alloc("plain").as_str(), "plain");
    }

    #[test]
    fn test_global_map_reset_drops_history() {
        let mut alloc = MapAllocator::new();
        let before = alloc.alloc("a");
        assert_eq!(alloc.len(), 1);
        alloc.reset();
        assert!(alloc.is_empty());
        assert_ne!(alloc.alloc("a"), before);
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            AllocStrategy::seeded("").validate(),
            Err(AllocError::EmptySeed)
        );
        assert_eq!(
            AllocStrategy::RandomHash { cache_size: 0 }.validate(),
            Err(AllocError::ZeroCacheSize)
        );
        assert!(AllocStrategy::Counter.validate().is_ok());
    }

    #[test]
    fn test_seeded_scopes_are_isolated_but_reproducible() {
        let strategy = AllocStrategy::seeded("seed");
        let g1 = GraphName::Named(Term::iri("http://example.org/g1"));
        let g2 = GraphName::Named(Term::iri("http://example.org/g2"));

        let a1 = strategy.build_for_scope(&g1).alloc("x");
        let a2 = strategy.build_for_scope(&g2).alloc("x");
        let again = strategy.build_for_scope(&g1).alloc("x");

        assert_ne!(a1, a2);
        assert_eq!(a1, again);
    }
}
