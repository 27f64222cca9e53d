//! Token types shared by the Turtle-family grammars.
//!
//! Tokens are the output of lexical analysis, ready for parsing.

use std::sync::Arc;

use brook_graph_ir::TextPosition;

/// A token with its source span and position.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte span in the source
    pub start: usize,
    pub end: usize,
    /// 1-based line and column of the first character
    pub position: TextPosition,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize, position: TextPosition) -> Self {
        Self {
            kind,
            start,
            end,
            position,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Same kind as `kind`, ignoring payloads
    pub fn is(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.kind) == std::mem::discriminant(kind)
    }
}

/// How a string literal was quoted in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quote {
    /// `"..."`
    Double,
    /// `'...'`
    Single,
    /// `"""..."""`
    LongDouble,
    /// `'''...'''`
    LongSingle,
}

impl Quote {
    /// Single-quoted forms are a Turtle extension over N-Triples.
    pub fn is_single(self) -> bool {
        matches!(self, Quote::Single | Quote::LongSingle)
    }

    /// Triple-quoted forms may span lines.
    pub fn is_long(self) -> bool {
        matches!(self, Quote::LongDouble | Quote::LongSingle)
    }

    /// The quote character itself
    pub fn mark(self) -> char {
        if self.is_single() {
            '\''
        } else {
            '"'
        }
    }

    /// Opening and closing delimiter
    pub fn delimiter(self) -> &'static str {
        match self {
            Quote::Double => "\"",
            Quote::Single => "'",
            Quote::LongDouble => "\"\"\"",
            Quote::LongSingle => "'''",
        }
    }

    /// Quote style of a string literal starting at the beginning of `input`
    pub fn opening(input: &str) -> Option<Quote> {
        [Quote::LongDouble, Quote::LongSingle, Quote::Double, Quote::Single]
            .into_iter()
            .find(|quote| input.starts_with(quote.delimiter()))
    }
}

/// Token kinds for Turtle, TriG, N-Triples and N-Quads.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// `<...>`, escapes decoded, not yet resolved against the base
    Iri(Arc<str>),
    /// `prefix:` with an empty local part
    PrefixedNameNs(Arc<str>),
    PrefixedName {
        prefix: Arc<str>,
        /// Escapes decoded, `%xx` kept
        local: Arc<str>,
    },
    /// `_:label`
    BlankNodeLabel(Arc<str>),
    /// `[]`, possibly with whitespace inside
    Anon,
    /// `()`
    Nil,

    String {
        value: Arc<str>,
        quote: Quote,
    },
    // Numbers keep their lexical form as written
    Integer(Arc<str>),
    Decimal(Arc<str>),
    Double(Arc<str>),
    /// Without the `@`
    LangTag(Arc<str>),

    KwPrefix,
    KwBase,
    /// `PREFIX`, any case
    KwSparqlPrefix,
    KwSparqlBase,
    KwGraph,
    KwA,
    KwTrue,
    KwFalse,

    Dot,
    Comma,
    Semicolon,
    DoubleCaret,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Equals,
    Implies,

    Eof,
}

impl TokenKind {
    /// Source text of a payload-free kind
    fn symbol(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Anon => "[]",
            TokenKind::Nil => "()",
            TokenKind::KwPrefix => "@prefix",
            TokenKind::KwBase => "@base",
            TokenKind::KwSparqlPrefix => "PREFIX",
            TokenKind::KwSparqlBase => "BASE",
            TokenKind::KwGraph => "GRAPH",
            TokenKind::KwA => "a",
            TokenKind::KwTrue => "true",
            TokenKind::KwFalse => "false",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::DoubleCaret => "^^",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Equals => "=",
            TokenKind::Implies => "=>",
            TokenKind::Eof => "EOF",
            _ => return None,
        })
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(symbol) = self.symbol() {
            return f.write_str(symbol);
        }
        match self {
            TokenKind::Iri(iri) => write!(f, "<{}>", iri),
            TokenKind::PrefixedNameNs(prefix) => write!(f, "{}:", prefix),
            TokenKind::PrefixedName { prefix, local } => write!(f, "{}:{}", prefix, local),
            TokenKind::BlankNodeLabel(label) => write!(f, "_:{}", label),
            TokenKind::String { value, quote } => write!(f, "{0}{1}{0}", quote.delimiter(), value),
            TokenKind::Integer(n) | TokenKind::Decimal(n) | TokenKind::Double(n) => f.write_str(n),
            TokenKind::LangTag(tag) => write!(f, "@{}", tag),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_opening_prefers_long_form() {
        assert_eq!(Quote::opening(r#""""x""""#), Some(Quote::LongDouble));
        assert_eq!(Quote::opening("''"), Some(Quote::Single));
        assert_eq!(Quote::opening("x"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::Eof.to_string(), "EOF");
        assert_eq!(TokenKind::LBrace.to_string(), "{");
        assert_eq!(
            TokenKind::String {
                value: Arc::from("hi"),
                quote: Quote::LongSingle,
            }
            .to_string(),
            "'''hi'''"
        );
    }
}
