//! Error types for Turtle-family parsing

use brook_graph_ir::{SinkError, TextPosition};

/// Error type for Turtle, TriG, N-Triples and N-Quads parsing
///
/// Positions are 1-based; [`TextPosition::UNKNOWN`] marks errors raised
/// away from any token (e.g. by the term factory) until the engine attaches
/// the current position.
#[derive(Debug, thiserror::Error)]
pub enum TurtleError {
    /// Lexer error (invalid token)
    #[error("Lexer error {position}: {message}")]
    Lexer {
        position: TextPosition,
        message: String,
    },

    /// Parser error (unexpected token or invalid structure)
    #[error("Parse error {position}: {message}")]
    Parse {
        position: TextPosition,
        message: String,
    },

    /// Term not allowed in its position, or rejected literal form
    #[error("Bad term {position}: {message}")]
    Term {
        position: TextPosition,
        message: String,
    },

    /// IRI resolution error (relative IRI without base)
    #[error("IRI resolution error: {0}")]
    IriResolution(String),

    /// Prefix not defined
    #[error("Undefined prefix '{prefix}' {position}")]
    UndefinedPrefix {
        position: TextPosition,
        prefix: String,
    },

    /// The sink refused a statement; not a syntax problem
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Result type for Turtle operations
pub type Result<T> = std::result::Result<T, TurtleError>;

impl TurtleError {
    /// Create a lexer error
    pub fn lexer(position: TextPosition, message: impl Into<String>) -> Self {
        Self::Lexer {
            position,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(position: TextPosition, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create a term error
    pub fn term(position: TextPosition, message: impl Into<String>) -> Self {
        Self::Term {
            position,
            message: message.into(),
        }
    }

    /// Create an undefined-prefix error
    pub fn undefined_prefix(position: TextPosition, prefix: impl Into<String>) -> Self {
        Self::UndefinedPrefix {
            position,
            prefix: prefix.into(),
        }
    }

    /// Source position, if the error has one
    pub fn position(&self) -> Option<TextPosition> {
        match self {
            Self::Lexer { position, .. }
            | Self::Parse { position, .. }
            | Self::Term { position, .. }
            | Self::UndefinedPrefix { position, .. } => Some(*position),
            Self::IriResolution(_) | Self::Sink(_) => None,
        }
    }

    /// Fill in `position` where the error has none yet.
    pub fn at(mut self, at: TextPosition) -> Self {
        match &mut self {
            Self::Lexer { position, .. }
            | Self::Parse { position, .. }
            | Self::Term { position, .. }
            | Self::UndefinedPrefix { position, .. } => {
                if !position.is_known() {
                    *position = at;
                }
            }
            Self::IriResolution(_) | Self::Sink(_) => {}
        }
        self
    }

    /// Whether the error came from malformed input rather than the sink
    pub fn is_syntax(&self) -> bool {
        !matches!(self, Self::Sink(_))
    }
}
