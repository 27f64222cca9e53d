//! Streaming RDF text parsing.
//!
//! `brook-rdf` ties the workspace crates together behind one builder,
//! [`RdfParser`]. Pick a [`Syntax`], tune blank-node allocation and
//! strictness, then either push statements into your own
//! [`StreamSink`], collect a [`Dataset`], or pull them from an iterator
//! while a worker thread parses.
//!
//! ```
//! use brook_rdf::{PipeConfig, RdfParser, Syntax};
//!
//! let input = "\
//!     <http://example.org/s> <http://example.org/p> \"one\" .\n\
//!     <http://example.org/s> <http://example.org/p> \"two\" .\n";
//!
//! let iter = RdfParser::new(Syntax::NTriples)
//!     .spawn_triples(input, PipeConfig::default())
//!     .unwrap();
//!
//! let objects: Vec<String> = iter
//!     .map(|t| t.unwrap().o.to_string())
//!     .collect();
//! assert_eq!(objects, vec!["\"one\"", "\"two\""]);
//! ```
//!
//! The underlying crates stay usable on their own:
//! - [`brook_graph_ir`]: terms, statements, sinks, writers
//! - [`brook_bnode`]: blank-node allocators and scoping
//! - [`brook_graph_turtle`]: lexer and grammars
//! - [`brook_stream`]: the push-to-pull bridge

pub mod config;
pub mod error;
pub mod parser;

pub use config::ParserConfig;
pub use error::{RdfError, Result};
pub use parser::RdfParser;

pub use brook_bnode::{AllocStrategy, LabelToNode, ScopePolicy, SharedLabelToNode};
pub use brook_graph_ir::{
    BlankId, Dataset, DatasetCollectorSink, GraphName, Quad, SinkError, SinkResult, StreamSink,
    Term, TextPosition, Triple,
};
pub use brook_graph_turtle::{
    CollectingErrorHandler, ErrorHandler, LoggingErrorHandler, Syntax, TurtleError,
};
pub use brook_stream::{PipeConfig, PipeError, PipedRdfIterator, PipedStream};

/// Well-known namespace IRIs
pub use brook_vocab as vocab;
