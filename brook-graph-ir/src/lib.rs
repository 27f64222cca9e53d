//! Format-agnostic RDF statement model and push-style sink capability
//!
//! This crate provides the types every brook parser produces and every
//! consumer receives, regardless of the syntax being parsed (Turtle, TriG,
//! N-Triples, N-Quads).
//!
//! # Key Design Principles
//!
//! 1. **Resolved IRIs only** - IRIs are stored resolved against the base and
//!    with prefixes expanded.
//!
//! 2. **Opaque blank nodes** - A blank node's identity is whatever the
//!    active allocator produced; equality of identities is node identity.
//!
//! 3. **One push interface** - Parsers talk to a [`StreamSink`]; collecting
//!    in memory and handing statements to another thread are two adapters of
//!    the same trait.
//!
//! # Example
//!
//! ```
//! use brook_graph_ir::{Dataset, Term, Triple};
//!
//! let mut dataset = Dataset::new();
//! dataset.add_triple(Triple::new(
//!     Term::iri("http://example.org/alice"),
//!     Term::iri("http://xmlns.com/foaf/0.1/name"),
//!     Term::plain("Alice"),
//! ));
//! assert_eq!(dataset.len(), 1);
//! ```

mod dataset;
pub mod format;
pub mod label;
mod position;
mod sink;
mod term;
mod triple;

pub use dataset::Dataset;
pub use position::TextPosition;
pub use sink::{DatasetCollectorSink, SinkError, SinkResult, StreamSink};
pub use term::{escape_string, BlankId, Term};
pub use triple::{GraphName, Quad, Triple};
