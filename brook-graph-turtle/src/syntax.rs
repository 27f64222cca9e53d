//! Syntax selection and the single parse entry point.

use std::fmt;
use std::str::FromStr;

use brook_graph_ir::StreamSink;
use serde::{Deserialize, Serialize};

use crate::context::ParseContext;
use crate::error::{Result, TurtleError};
use crate::{ntriples, turtle};

/// The RDF text syntaxes this crate reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    #[default]
    Turtle,
    TriG,
    NTriples,
    NQuads,
}

impl Syntax {
    pub const ALL: [Syntax; 4] = [Syntax::Turtle, Syntax::TriG, Syntax::NTriples, Syntax::NQuads];

    /// Whether parsing emits quads rather than triples.
    pub fn emits_quads(self) -> bool {
        matches!(self, Syntax::TriG | Syntax::NQuads)
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Syntax::Turtle => "text/turtle",
            Syntax::TriG => "application/trig",
            Syntax::NTriples => "application/n-triples",
            Syntax::NQuads => "application/n-quads",
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            Syntax::Turtle => "ttl",
            Syntax::TriG => "trig",
            Syntax::NTriples => "nt",
            Syntax::NQuads => "nq",
        }
    }

    /// Guess the syntax from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Syntax> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.file_extension() == ext)
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Syntax::Turtle => "Turtle",
            Syntax::TriG => "TriG",
            Syntax::NTriples => "N-Triples",
            Syntax::NQuads => "N-Quads",
        };
        f.write_str(name)
    }
}

/// Accepts the display name, the serde name, a file extension or a media
/// type, case-insensitively.
impl FromStr for Syntax {
    type Err = TurtleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let syntax = match lower.as_str() {
            "turtle" | "ttl" | "text/turtle" => Syntax::Turtle,
            "trig" | "application/trig" => Syntax::TriG,
            "ntriples" | "n-triples" | "nt" | "application/n-triples" => Syntax::NTriples,
            "nquads" | "n-quads" | "nq" | "application/n-quads" => Syntax::NQuads,
            _ => {
                return Err(TurtleError::parse(
                    brook_graph_ir::TextPosition::UNKNOWN,
                    format!("unknown RDF syntax '{}'", s),
                ))
            }
        };
        Ok(syntax)
    }
}

/// Parse `input` in the given syntax, pushing everything to `sink`.
///
/// The sink sees `on_start`, then directives and statements in document
/// order, then `on_finish`. On error the parse stops at the first problem,
/// statements already pushed stay pushed, and `on_finish` is not called.
pub fn parse<S: StreamSink + ?Sized>(
    syntax: Syntax,
    input: &str,
    ctx: &mut ParseContext,
    sink: &mut S,
) -> Result<()> {
    match syntax {
        Syntax::Turtle => turtle::parse_turtle(input, ctx, sink),
        Syntax::TriG => turtle::parse_trig(input, ctx, sink),
        Syntax::NTriples => ntriples::parse_ntriples(input, ctx, sink),
        Syntax::NQuads => ntriples::parse_nquads(input, ctx, sink),
    }
}
