//! Turtle-family parsers for brook.
//!
//! One lexer and one parser engine drive four grammars: Turtle, TriG,
//! N-Triples and N-Quads. Every grammar pushes what it reads into a
//! [`StreamSink`](brook_graph_ir::StreamSink), so the same parse can fill an
//! in-memory [`Dataset`](brook_graph_ir::Dataset) or feed a cross-thread
//! iterator.
//!
//! Per-document state (base IRI, prefixes, blank-node labels, strictness) is
//! held in a [`ParseContext`], which is also the term factory. Syntax errors
//! are reported to the context's [`ErrorHandler`] and abort the parse.
//!
//! # Example
//!
//! ```
//! use brook_graph_ir::DatasetCollectorSink;
//! use brook_graph_turtle::{parse, ParseContext, Syntax};
//!
//! let trig = r#"
//!     @prefix ex: <http://example.org/> .
//!     ex:g { ex:alice ex:name "Alice" ; ex:age 30 . }
//! "#;
//!
//! let mut ctx = ParseContext::new();
//! let mut sink = DatasetCollectorSink::new();
//! parse(Syntax::TriG, trig, &mut ctx, &mut sink).unwrap();
//!
//! let dataset = sink.finish();
//! assert_eq!(dataset.quads().len(), 2);
//! assert!(dataset.quads().iter().all(|q| !q.g.is_default()));
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod handler;
pub mod iri;
pub mod lex;
pub mod ntriples;
pub mod syntax;
pub mod turtle;

pub use context::{ParseContext, DEFAULT_MAX_DEPTH};
pub use engine::TokenStream;
pub use error::{Result, TurtleError};
pub use handler::{CollectingErrorHandler, Diagnostic, ErrorHandler, LoggingErrorHandler, Severity};
pub use lex::{tokenize, Lexer, Token, TokenKind};
pub use ntriples::{parse_nquads, parse_ntriples};
pub use syntax::{parse, Syntax};
pub use turtle::{parse_trig, parse_turtle};
