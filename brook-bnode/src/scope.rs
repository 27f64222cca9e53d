//! Label scoping: which labels denote the same node.
//!
//! A [`LabelToNode`] pairs a [`ScopePolicy`] with an allocation strategy.
//! The policy decides whether `_:b0` in two different named graphs is the
//! same node; the strategy decides what identity a node gets.

use std::collections::HashMap;
use std::sync::Arc;

use brook_graph_ir::{BlankId, GraphName};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use crate::allocator::{AllocStrategy, Allocator, NodeAllocator};
use crate::error::Result;

/// How the scope argument of a lookup is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopePolicy {
    /// No map of our own; the scope is ignored and the allocator's `alloc`
    /// is the whole story. Memory is whatever the strategy needs.
    #[default]
    Fixed,
    /// One label table for the whole document, whatever the scope.
    Single,
    /// One label table per graph, created on first use.
    PerGraph,
    /// One allocator instance per graph, created on first use.
    PerGraphAllocator,
}

/// Label-to-identity mapping for one parse run (or longer, when shared).
#[derive(Debug)]
pub struct LabelToNode {
    policy: ScopePolicy,
    strategy: AllocStrategy,
    allocator: Allocator,
    single: HashMap<String, BlankId>,
    per_graph: HashMap<GraphName, HashMap<String, BlankId>>,
    per_graph_alloc: HashMap<GraphName, Allocator>,
}

impl Default for LabelToNode {
    fn default() -> Self {
        Self::build(ScopePolicy::default(), AllocStrategy::default())
    }
}

impl LabelToNode {
    /// Create a mapping, rejecting an unusable strategy configuration.
    pub fn new(policy: ScopePolicy, strategy: AllocStrategy) -> Result<Self> {
        strategy.validate()?;
        Ok(Self::build(policy, strategy))
    }

    fn build(policy: ScopePolicy, strategy: AllocStrategy) -> Self {
        Self {
            policy,
            allocator: strategy.build(),
            strategy,
            single: HashMap::new(),
            per_graph: HashMap::new(),
            per_graph_alloc: HashMap::new(),
        }
    }

    pub fn policy(&self) -> ScopePolicy {
        self.policy
    }

    pub fn strategy(&self) -> &AllocStrategy {
        &self.strategy
    }

    /// Number of graph scopes with their own table or allocator
    pub fn scope_count(&self) -> usize {
        match self.policy {
            ScopePolicy::Fixed | ScopePolicy::Single => 1,
            ScopePolicy::PerGraph => self.per_graph.len(),
            ScopePolicy::PerGraphAllocator => self.per_graph_alloc.len(),
        }
    }

    /// Identity for `label` within `scope`.
    ///
    /// Table-based policies (`Single`, `PerGraph`) give every new label a
    /// fresh `create()` identity and never consult the strategy's `alloc`.
    /// The same label in two scopes then never shares a node, but identities
    /// follow the order labels first appear and the tables grow with the
    /// number of distinct labels.
    pub fn get(&mut self, scope: &GraphName, label: &str) -> BlankId {
        match self.policy {
            ScopePolicy::Fixed => self.allocator.alloc(label),
            ScopePolicy::Single => {
                let allocator = &mut self.allocator;
                self.single
                    .entry(label.to_string())
                    .or_insert_with(|| allocator.create())
                    .clone()
            }
            ScopePolicy::PerGraph => {
                let allocator = &mut self.allocator;
                self.per_graph
                    .entry(scope.clone())
                    .or_default()
                    .entry(label.to_string())
                    .or_insert_with(|| allocator.create())
                    .clone()
            }
            ScopePolicy::PerGraphAllocator => self.scoped_allocator(scope).alloc(label),
        }
    }

    /// Fresh anonymous identity within `scope`.
    pub fn create(&mut self, scope: &GraphName) -> BlankId {
        match self.policy {
            ScopePolicy::PerGraphAllocator => self.scoped_allocator(scope).create(),
            _ => self.allocator.create(),
        }
    }

    /// Drop every table and allocator history.
    pub fn reset(&mut self) {
        tracing::debug!(
            policy = ?self.policy,
            scopes = self.scope_count(),
            "resetting blank node labels"
        );
        self.allocator.reset();
        self.single.clear();
        self.per_graph.clear();
        self.per_graph_alloc.clear();
    }

    fn scoped_allocator(&mut self, scope: &GraphName) -> &mut Allocator {
        let strategy = &self.strategy;
        self.per_graph_alloc
            .entry(scope.clone())
            .or_insert_with(|| strategy.build_for_scope(scope))
    }
}

/// A [`LabelToNode`] shared between parse runs and threads.
///
/// Cloning shares the same underlying table, so a global-map strategy keeps
/// label identities stable across every document parsed through any clone.
#[derive(Clone, Debug, Default)]
pub struct SharedLabelToNode {
    inner: Arc<Mutex<LabelToNode>>,
}

impl SharedLabelToNode {
    pub fn new(mapping: LabelToNode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(mapping)),
        }
    }

    pub fn get(&self, scope: &GraphName, label: &str) -> BlankId {
        self.inner.lock().get(scope, label)
    }

    pub fn create(&self, scope: &GraphName) -> BlankId {
        self.inner.lock().create(scope)
    }

    pub fn reset(&self) {
        self.inner.lock().reset()
    }

    /// Lock for a batch of operations
    pub fn lock(&self) -> MutexGuard<'_, LabelToNode> {
        self.inner.lock()
    }
}

/// The label mapping a parser uses: owned for one run, or shared.
#[derive(Debug)]
pub enum LabelMapping {
    Owned(LabelToNode),
    Shared(SharedLabelToNode),
}

impl Default for LabelMapping {
    fn default() -> Self {
        LabelMapping::Owned(LabelToNode::default())
    }
}

impl LabelMapping {
    pub fn get(&mut self, scope: &GraphName, label: &str) -> BlankId {
        match self {
            LabelMapping::Owned(m) => m.get(scope, label),
            LabelMapping::Shared(m) => m.get(scope, label),
        }
    }

    pub fn create(&mut self, scope: &GraphName) -> BlankId {
        match self {
            LabelMapping::Owned(m) => m.create(scope),
            LabelMapping::Shared(m) => m.create(scope),
        }
    }

    pub fn reset(&mut self) {
        match self {
            LabelMapping::Owned(m) => m.reset(),
            LabelMapping::Shared(m) => m.reset(),
        }
    }
}

impl From<LabelToNode> for LabelMapping {
    fn from(mapping: LabelToNode) -> Self {
        LabelMapping::Owned(mapping)
    }
}

impl From<SharedLabelToNode> for LabelMapping {
    fn from(mapping: SharedLabelToNode) -> Self {
        LabelMapping::Shared(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brook_graph_ir::Term;

    fn g(name: &str) -> GraphName {
        GraphName::Named(Term::iri(format!("http://example.org/{}", name)))
    }

    fn mapping(policy: ScopePolicy, strategy: AllocStrategy) -> LabelToNode {
        LabelToNode::new(policy, strategy).unwrap()
    }

    #[test]
    fn test_single_shares_labels_across_graphs() {
        let mut m = mapping(ScopePolicy::Single, AllocStrategy::Counter);
        let a = m.get(&g("g1"), "b");
        assert_eq!(m.get(&g("g2"), "b"), a);
        assert_eq!(m.get(&GraphName::Default, "b"), a);
        assert_ne!(m.get(&g("g1"), "c"), a);
    }

    #[test]
    fn test_per_graph_isolates_labels() {
        let mut m = mapping(ScopePolicy::PerGraph, AllocStrategy::default());
        let a1 = m.get(&g("g1"), "b");
        let a2 = m.get(&g("g2"), "b");
        assert_ne!(a1, a2);
        assert_eq!(m.get(&g("g1"), "b"), a1);
        assert_eq!(m.scope_count(), 2);
    }

    #[test]
    fn test_per_graph_isolates_even_with_label_as_given() {
        let mut m = mapping(ScopePolicy::PerGraph, AllocStrategy::AsGiven);
        assert_ne!(m.get(&g("g1"), "b"), m.get(&g("g2"), "b"));
    }

    #[test]
    fn test_fixed_ignores_scope() {
        let mut m = mapping(ScopePolicy::Fixed, AllocStrategy::AsGiven);
        assert_eq!(m.get(&g("g1"), "b").as_str(), "b");
        assert_eq!(m.get(&g("g2"), "b").as_str(), "b");
    }

    #[test]
    fn test_per_graph_allocator_seeded_is_reproducible() {
        let strategy = AllocStrategy::seeded("seed");
        let mut first = mapping(ScopePolicy::PerGraphAllocator, strategy.clone());
        let mut second = mapping(ScopePolicy::PerGraphAllocator, strategy);

        let a = first.get(&g("g1"), "b");
        assert_ne!(a, first.get(&g("g2"), "b"));
        assert_eq!(second.get(&g("g1"), "b"), a);
    }

    #[test]
    fn test_create_never_matches_labels() {
        let mut m = mapping(ScopePolicy::Single, AllocStrategy::Counter);
        let labelled = m.get(&GraphName::Default, "x");
        let fresh = m.create(&GraphName::Default);
        assert_ne!(labelled, fresh);
        assert_ne!(m.create(&GraphName::Default), fresh);
    }

    #[test]
    fn test_reset_forgets_labels() {
        let mut m = mapping(ScopePolicy::PerGraph, AllocStrategy::default());
        let before = m.get(&g("g1"), "b");
        m.reset();
        assert_eq!(m.scope_count(), 0);
        assert_ne!(m.get(&g("g1"), "b"), before);
    }

    #[test]
    fn test_default_policy_derives_from_label() {
        let mut m = LabelToNode::default();
        assert_eq!(m.policy(), ScopePolicy::Fixed);
        for i in 0..5000 {
            m.get(&GraphName::Default, &format!("b{}", i));
        }
        assert!(m.single.is_empty());
        assert!(m.per_graph.is_empty());
        match &m.allocator {
            Allocator::Hash(hash) => assert!(hash.cached() <= crate::DEFAULT_CACHE_SIZE),
            other => panic!("unexpected allocator {:?}", other),
        }
    }

    #[test]
    fn test_fixed_seeded_ignores_label_order() {
        let strategy = AllocStrategy::seeded("fixed");
        let mut first = mapping(ScopePolicy::Fixed, strategy.clone());
        let mut second = mapping(ScopePolicy::Fixed, strategy);

        let a = first.get(&GraphName::Default, "a");
        second.get(&GraphName::Default, "z");
        assert_eq!(second.get(&GraphName::Default, "a"), a);
    }

    #[test]
    fn test_new_rejects_invalid_strategy() {
        assert!(LabelToNode::new(ScopePolicy::Single, AllocStrategy::seeded("")).is_err());
    }

    #[test]
    fn test_shared_mapping_across_threads() {
        let shared = SharedLabelToNode::new(mapping(ScopePolicy::Fixed, AllocStrategy::GlobalMap));
        let here = shared.get(&GraphName::Default, "node");

        let remote = shared.clone();
        let there = std::thread::spawn(move || remote.get(&GraphName::Default, "node"))
            .join()
            .unwrap();

        assert_eq!(here, there);

        let mut as_mapping = LabelMapping::from(shared.clone());
        assert_eq!(as_mapping.get(&g("other"), "node"), here);
    }
}
