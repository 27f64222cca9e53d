//! Lexer for the Turtle family of syntaxes.
//!
//! One tokenizer serves Turtle, TriG, N-Triples and N-Quads; each grammar
//! decides which tokens it accepts.

pub mod chars;
pub mod lexer;
pub mod token;

pub use lexer::{tokenize, Lexer};
pub use token::{Quote, Token, TokenKind};
