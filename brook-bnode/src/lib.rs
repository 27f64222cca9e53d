//! Blank node identity allocation
//!
//! Parsers turn each `_:label` and each anonymous node (`[]`, collection
//! cells) into a [`BlankId`]. Two orthogonal choices decide how:
//!
//! - the **strategy** ([`AllocStrategy`]): how an identity is derived
//!   (counter, global table, seeded or random hash, label text, decoded label)
//! - the **scope policy** ([`ScopePolicy`]): which labels denote the same
//!   node (whole document, per named graph, or per graph allocator)
//!
//! # Example
//!
//! ```
//! use brook_bnode::{AllocStrategy, LabelToNode, ScopePolicy};
//! use brook_graph_ir::GraphName;
//!
//! let mut labels = LabelToNode::new(ScopePolicy::Single, AllocStrategy::seeded("run-1")).unwrap();
//! let a = labels.get(&GraphName::Default, "b0");
//! assert_eq!(labels.get(&GraphName::Default, "b0"), a);
//! assert_ne!(labels.create(&GraphName::Default), a);
//! ```
//!
//! [`BlankId`]: brook_graph_ir::BlankId

mod allocator;
pub mod error;
mod hash;
mod scope;

pub use allocator::{
    AllocStrategy, Allocator, CounterAllocator, EncodedLabelAllocator, LabelAllocator,
    MapAllocator, NodeAllocator,
};
pub use brook_graph_ir::label::{decode_label, encode_label};
pub use error::{AllocError, Result};
pub use hash::{HashAllocator, DEFAULT_CACHE_SIZE};
pub use scope::{LabelMapping, LabelToNode, ScopePolicy, SharedLabelToNode};
