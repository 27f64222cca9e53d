//! Lexer for the Turtle family, built on winnow.
//!
//! The lexer is a lazy iterator: tokens are produced on demand, each with its
//! byte span and 1-based line/column. The first invalid token yields a
//! [`TurtleError::Lexer`] with the offending line and a caret pointer, after
//! which the iterator is exhausted.

use std::sync::Arc;

use brook_graph_ir::TextPosition;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, opt, peek, preceded, repeat};
use winnow::error::{ContextError, ErrMode};
use winnow::stream::{AsChar, Location, Stream};
use winnow::token::{any, one_of, take, take_till, take_while};
use winnow::{LocatingSlice, ModalResult, Parser};

use super::chars::*;
use super::token::{Quote, Token, TokenKind};
use crate::error::{Result, TurtleError};

/// Input type for the lexer - tracks position for spans.
pub type Input<'a> = LocatingSlice<&'a str>;

/// Characters a local name may carry after a backslash
const LOCAL_ESCAPES: &str = "_~.-!$&'()*+,;=/?#@%";

/// Lexer for Turtle-family documents.
pub struct Lexer<'a> {
    source: &'a str,
    input: Input<'a>,
    /// Byte offset up to which `line`/`column` are known
    scanned: usize,
    line: i64,
    column: i64,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            input: LocatingSlice::new(source),
            scanned: 0,
            line: 1,
            column: 1,
            done: false,
        }
    }

    /// Tokenize the entire input, ending with an EOF token.
    pub fn tokenize(self) -> Result<Vec<Token>> {
        self.collect()
    }

    /// Line and column of a byte offset at or after the last one asked for.
    fn position_at(&mut self, offset: usize) -> TextPosition {
        let end = offset.min(self.source.len());
        if end > self.scanned {
            for c in self.source[self.scanned..end].chars() {
                if c == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
            }
            self.scanned = end;
        }
        TextPosition::new(self.line, self.column)
    }

    /// Describe the token that failed to lex at `offset`, quoting the source
    /// line with a caret under the offending column.
    fn error_at(&self, offset: usize, position: TextPosition) -> TurtleError {
        let what = match self.source[offset..].chars().next() {
            Some('"' | '\'') => "unterminated string literal".to_string(),
            Some('<') => "invalid or unterminated IRI".to_string(),
            Some(c) if !c.is_ascii() => format!(
                "unexpected character '{}' (U+{:04X})",
                c.escape_unicode(),
                c as u32
            ),
            Some(c) => format!("unexpected character '{}'", c),
            None => "unexpected end of input".to_string(),
        };

        let (line, col) = (position.line, position.column);
        let text = self
            .source
            .lines()
            .nth((line.max(1) - 1) as usize)
            .unwrap_or("");
        let caret = " ".repeat((col.max(1) - 1) as usize);

        TurtleError::lexer(
            position,
            format!(
                "{} at line {}, column {}\n  |\n{} | {}\n  | {}^",
                what, line, col, line, text, caret
            ),
        )
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        skip_trivia(&mut self.input);

        let start = self.input.current_token_start();
        let position = self.position_at(start);

        if self.input.is_empty() {
            self.done = true;
            return Some(Ok(Token::new(TokenKind::Eof, start, start, position)));
        }

        match next_token(&mut self.input) {
            Ok(kind) => {
                let end = self.input.current_token_start();
                Some(Ok(Token::new(kind, start, end, position)))
            }
            Err(_) => {
                self.done = true;
                Some(Err(self.error_at(start, position)))
            }
        }
    }
}

fn backtrack<T>() -> ModalResult<T> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

/// Whitespace and `#` comments
fn skip_trivia(input: &mut Input<'_>) {
    let _: ModalResult<()> = repeat(
        0..,
        alt((
            take_while(1.., is_ws).void(),
            ('#', take_till(0.., ['\n', '\r'])).void(),
        )),
    )
    .parse_next(input);
}

/// Pick a token rule from the first character.
fn next_token(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    let mut ahead = input.chars();
    let Some(first) = ahead.next() else {
        return backtrack();
    };
    let second = ahead.next();

    match first {
        '<' => iri_ref(input),
        '"' | '\'' => string_literal(input),
        '@' => at_word(input),
        '_' if second == Some(':') => blank_node_label(input),
        ':' => prefixed_name(input, String::new()),
        '[' => alt((
            ('[', multispace0, ']').value(TokenKind::Anon),
            punctuation,
        ))
        .parse_next(input),
        '(' => alt((
            ('(', multispace0, ')').value(TokenKind::Nil),
            punctuation,
        ))
        .parse_next(input),
        '^' => "^^".value(TokenKind::DoubleCaret).parse_next(input),
        '=' => alt((
            "=>".value(TokenKind::Implies),
            '='.value(TokenKind::Equals),
        ))
        .parse_next(input),
        '+' | '-' | '0'..='9' => number(input),
        '.' if second.is_some_and(|c| c.is_ascii_digit()) => number(input),
        c if is_pn_prefix_start(c) => name_or_keyword(input),
        _ => punctuation(input),
    }
}

// =============================================================================
// IRIs and escapes
// =============================================================================

/// `<...>`, with `\u` / `\U` escapes decoded. Empty IRIs are relative
/// references to the base.
fn iri_ref(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    '<'.parse_next(input)?;
    let mut iri = String::new();
    loop {
        let chunk: &str = take_while(0.., is_iri_char).parse_next(input)?;
        iri.push_str(chunk);

        match input.chars().next() {
            Some('>') => {
                '>'.parse_next(input)?;
                return Ok(TokenKind::Iri(Arc::from(iri)));
            }
            Some('\\') => {
                '\\'.parse_next(input)?;
                let digits = match any.parse_next(input)? {
                    'u' => 4,
                    'U' => 8,
                    _ => return backtrack(),
                };
                iri.push(code_point(input, digits)?);
            }
            _ => return backtrack(),
        }
    }
}

/// `digits` hex digits naming a Unicode scalar value
fn code_point(input: &mut Input<'_>, digits: usize) -> ModalResult<char> {
    take_while(digits, AsChar::is_hex_digit)
        .verify_map(|hex: &str| u32::from_str_radix(hex, 16).ok().and_then(char::from_u32))
        .parse_next(input)
}

/// String escape, after the backslash
fn string_escape(input: &mut Input<'_>) -> ModalResult<char> {
    let c: char = any.parse_next(input)?;
    match c {
        't' => Ok('\t'),
        'b' => Ok('\u{8}'),
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        'f' => Ok('\u{c}'),
        '"' | '\'' | '\\' => Ok(c),
        'u' => code_point(input, 4),
        'U' => code_point(input, 8),
        _ => backtrack(),
    }
}

// =============================================================================
// Names and keywords
// =============================================================================

/// `@prefix`, `@base`, or a language tag
fn at_word(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    preceded(
        '@',
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-'),
    )
    .map(|word: &str| match word {
        "prefix" => TokenKind::KwPrefix,
        "base" => TokenKind::KwBase,
        tag => TokenKind::LangTag(Arc::from(tag)),
    })
    .parse_next(input)
}

/// Number of leading chars accepted by `allowed`, counting a dot only when
/// it sits between two accepted characters.
fn dotted_run(chars: impl Iterator<Item = char>, allowed: impl Fn(char) -> bool) -> usize {
    let mut len = 0;
    let mut dots = 0;
    for c in chars {
        if allowed(c) {
            len += dots + 1;
            dots = 0;
        } else if c == '.' && len > 0 {
            dots += 1;
        } else {
            break;
        }
    }
    len
}

fn dotted<'a>(input: &mut Input<'a>, allowed: fn(char) -> bool) -> ModalResult<&'a str> {
    match dotted_run(input.chars(), allowed) {
        0 => backtrack(),
        len => take(len).parse_next(input),
    }
}

/// A prefix followed by `:`, or a bare keyword.
///
/// The SPARQL-style keywords are case-insensitive.
fn name_or_keyword(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    let start = input.checkpoint();
    let word = dotted(input, is_pn_chars)?;

    if input.starts_with(':') {
        return prefixed_name(input, word.to_string());
    }

    let keyword = match word {
        "a" => TokenKind::KwA,
        "true" => TokenKind::KwTrue,
        "false" => TokenKind::KwFalse,
        w if w.eq_ignore_ascii_case("PREFIX") => TokenKind::KwSparqlPrefix,
        w if w.eq_ignore_ascii_case("BASE") => TokenKind::KwSparqlBase,
        w if w.eq_ignore_ascii_case("GRAPH") => TokenKind::KwGraph,
        _ => {
            input.reset(&start);
            return backtrack();
        }
    };
    Ok(keyword)
}

/// `prefix:` or `prefix:local`, positioned at the colon.
fn prefixed_name(input: &mut Input<'_>, prefix: String) -> ModalResult<TokenKind> {
    ':'.parse_next(input)?;
    let prefix: Arc<str> = Arc::from(prefix);
    Ok(match opt(local_name).parse_next(input)? {
        Some(local) => TokenKind::PrefixedName {
            prefix,
            local: Arc::from(local),
        },
        None => TokenKind::PrefixedNameNs(prefix),
    })
}

fn is_local_char(c: char) -> bool {
    is_pn_chars(c) || c == ':'
}

/// Local part of a prefixed name, with `%xx` kept and `\x` escapes decoded.
fn local_name(input: &mut Input<'_>) -> ModalResult<String> {
    match input.chars().next() {
        Some(c) if is_pn_local_start(c) || c == '%' || c == '\\' => {}
        _ => return backtrack(),
    }

    let mut local = String::new();
    loop {
        let chunk: &str = take_while(0.., is_local_char).parse_next(input)?;
        local.push_str(chunk);

        let mut ahead = input.chars();
        let (next, after) = (ahead.next(), ahead.next());
        match next {
            Some('%') => {
                let encoded: &str = ('%', take_while(2, AsChar::is_hex_digit))
                    .take()
                    .parse_next(input)?;
                local.push_str(encoded);
            }
            Some('\\') => {
                let escaped = preceded('\\', one_of(|c: char| LOCAL_ESCAPES.contains(c)))
                    .parse_next(input)?;
                local.push(escaped);
            }
            Some('.') if after.is_some_and(|c| is_local_char(c) || c == '%' || c == '\\') => {
                '.'.parse_next(input)?;
                local.push('.');
            }
            _ => break,
        }
    }

    if local.is_empty() {
        return backtrack();
    }
    Ok(local)
}

/// `_:label`; a trailing dot belongs to the statement, not the label.
fn blank_node_label(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    "_:".parse_next(input)?;
    match input.chars().next() {
        Some(c) if is_pn_chars_u(c) || c.is_ascii_digit() => {}
        _ => return backtrack(),
    }
    let label = dotted(input, is_pn_chars)?;
    Ok(TokenKind::BlankNodeLabel(Arc::from(label)))
}

// =============================================================================
// Literals
// =============================================================================

/// A string in any of the four quote styles, escapes decoded.
fn string_literal(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    let Some(quote) = Quote::opening(input) else {
        return backtrack();
    };
    quote.delimiter().parse_next(input)?;
    let value = string_body(input, quote)?;
    quote.delimiter().parse_next(input)?;
    Ok(TokenKind::String {
        value: Arc::from(value),
        quote,
    })
}

/// Content up to (not including) the closing delimiter.
///
/// Short strings stop at a line break; long strings keep lone quote
/// characters and stop at the first run of three that is not followed by a
/// fourth.
fn string_body(input: &mut Input<'_>, quote: Quote) -> ModalResult<String> {
    let mark = quote.mark();
    let long = quote.is_long();
    let mut value = String::new();

    loop {
        let chunk: &str = take_while(0.., |c: char| {
            c != mark && c != '\\' && (long || (c != '\n' && c != '\r'))
        })
        .parse_next(input)?;
        value.push_str(chunk);

        match input.chars().next() {
            Some('\\') => value.push(preceded('\\', string_escape).parse_next(input)?),
            Some(c) if c == mark && long => {
                let closes = input.starts_with(quote.delimiter())
                    && input.chars().nth(3) != Some(mark);
                if closes {
                    return Ok(value);
                }
                any.parse_next(input)?;
                value.push(c);
            }
            _ => return Ok(value),
        }
    }
}

/// Integer, decimal or double, keeping the lexical form as written.
fn number(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    let ((whole, fraction, exponent), lexical) = (
        preceded(opt(one_of(['+', '-'])), opt(digit1)),
        opt(alt((
            ('.', digit1).take(),
            ('.', peek(one_of(['e', 'E']))).take(),
        ))),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1).take()),
    )
        .with_taken()
        .parse_next(input)?;

    let has_digits = whole.is_some() || fraction.is_some_and(|f: &str| f.len() > 1);
    if !has_digits || (fraction == Some(".") && exponent.is_none()) {
        return backtrack();
    }

    let lexical = Arc::from(lexical);
    Ok(if exponent.is_some() {
        TokenKind::Double(lexical)
    } else if fraction.is_some() {
        TokenKind::Decimal(lexical)
    } else {
        TokenKind::Integer(lexical)
    })
}

fn punctuation(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    any.verify_map(|c| match c {
        '.' => Some(TokenKind::Dot),
        ',' => Some(TokenKind::Comma),
        ';' => Some(TokenKind::Semicolon),
        '[' => Some(TokenKind::LBracket),
        ']' => Some(TokenKind::RBracket),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        '{' => Some(TokenKind::LBrace),
        '}' => Some(TokenKind::RBrace),
        _ => None,
    })
    .parse_next(input)
}

/// Tokenize a whole document eagerly.
///
/// Returns an error on the first invalid token, with line/column
/// information and source context.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !matches!(k, TokenKind::Eof))
            .collect()
    }

    fn string(value: &str, quote: Quote) -> TokenKind {
        TokenKind::String {
            value: Arc::from(value),
            quote,
        }
    }

    fn pname(prefix: &str, local: &str) -> TokenKind {
        TokenKind::PrefixedName {
            prefix: Arc::from(prefix),
            local: Arc::from(local),
        }
    }

    #[test]
    fn test_iris() {
        assert_eq!(
            kinds("<http://example.org/> <>"),
            vec![
                TokenKind::Iri(Arc::from("http://example.org/")),
                TokenKind::Iri(Arc::from("")),
            ]
        );
        assert_eq!(
            kinds(r"<http://example.org/é\U0001F600>"),
            vec![TokenKind::Iri(Arc::from("http://example.org/\u{e9}\u{1F600}"))]
        );
    }

    #[test]
    fn test_iri_rejects_space_and_bad_escape() {
        assert!(tokenize("<http://example.org/a b>").is_err());
        assert!(tokenize(r"<http://example.org/\n>").is_err());
    }

    #[test]
    fn test_prefixed_names() {
        assert_eq!(kinds("ex:name"), vec![pname("ex", "name")]);
        assert_eq!(kinds("ex:"), vec![TokenKind::PrefixedNameNs(Arc::from("ex"))]);
        assert_eq!(kinds(":name"), vec![pname("", "name")]);
        assert_eq!(kinds(":"), vec![TokenKind::PrefixedNameNs(Arc::from(""))]);
        assert_eq!(kinds("my.ns:x"), vec![pname("my.ns", "x")]);
    }

    #[test]
    fn test_local_name_forms() {
        assert_eq!(kinds("ex:a.b"), vec![pname("ex", "a.b")]);
        assert_eq!(kinds("ex:a."), vec![pname("ex", "a"), TokenKind::Dot]);
        assert_eq!(kinds("ex:1st"), vec![pname("ex", "1st")]);
        assert_eq!(kinds("ex:a%20b"), vec![pname("ex", "a%20b")]);
        assert_eq!(kinds(r"ex:a\/b"), vec![pname("ex", "a/b")]);
        assert_eq!(kinds("ex:a:b"), vec![pname("ex", "a:b")]);
    }

    #[test]
    fn test_blank_nodes() {
        assert_eq!(
            kinds("_:b1 [] [ ] ( ) ()"),
            vec![
                TokenKind::BlankNodeLabel(Arc::from("b1")),
                TokenKind::Anon,
                TokenKind::Anon,
                TokenKind::Nil,
                TokenKind::Nil,
            ]
        );
        assert_eq!(
            kinds("_:b1."),
            vec![TokenKind::BlankNodeLabel(Arc::from("b1")), TokenKind::Dot]
        );
        assert_eq!(
            kinds("_:a.b"),
            vec![TokenKind::BlankNodeLabel(Arc::from("a.b"))]
        );
    }

    #[test]
    fn test_brackets_with_content_are_punctuation() {
        assert_eq!(
            kinds("[ ex:p 1 ]"),
            vec![
                TokenKind::LBracket,
                pname("ex", "p"),
                TokenKind::Integer(Arc::from("1")),
                TokenKind::RBracket,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("a true false @prefix @base PREFIX prefix BASE GRAPH graph"),
            vec![
                TokenKind::KwA,
                TokenKind::KwTrue,
                TokenKind::KwFalse,
                TokenKind::KwPrefix,
                TokenKind::KwBase,
                TokenKind::KwSparqlPrefix,
                TokenKind::KwSparqlPrefix,
                TokenKind::KwSparqlBase,
                TokenKind::KwGraph,
                TokenKind::KwGraph,
            ]
        );
    }

    #[test]
    fn test_unknown_bare_word_is_an_error() {
        assert!(tokenize("hello").is_err());
    }

    #[test]
    fn test_lang_tags() {
        assert_eq!(
            kinds("@en @en-US"),
            vec![
                TokenKind::LangTag(Arc::from("en")),
                TokenKind::LangTag(Arc::from("en-US")),
            ]
        );
    }

    #[test]
    fn test_string_quote_styles() {
        assert_eq!(kinds(r#""hello""#), vec![string("hello", Quote::Double)]);
        assert_eq!(kinds("'hello'"), vec![string("hello", Quote::Single)]);
        assert_eq!(
            kinds(r#""tab\tquote\"""#),
            vec![string("tab\tquote\"", Quote::Double)]
        );
        assert_eq!(kinds("'''it's'''"), vec![string("it's", Quote::LongSingle)]);
        assert_eq!(
            kinds("\"\"\"two\nlines\"\"\""),
            vec![string("two\nlines", Quote::LongDouble)]
        );
    }

    #[test]
    fn test_long_string_ending_in_quote() {
        assert_eq!(
            kinds(r#""""say "hi"""""#),
            vec![string(r#"say "hi""#, Quote::LongDouble)]
        );
    }

    #[test]
    fn test_short_string_cannot_span_lines() {
        assert!(tokenize("\"one\ntwo\"").is_err());
    }

    #[test]
    fn test_numbers_keep_lexical_form() {
        assert_eq!(
            kinds("42 -042 +7 3.14 .5 1e10 -1.5E-3 2.e3"),
            vec![
                TokenKind::Integer(Arc::from("42")),
                TokenKind::Integer(Arc::from("-042")),
                TokenKind::Integer(Arc::from("+7")),
                TokenKind::Decimal(Arc::from("3.14")),
                TokenKind::Decimal(Arc::from(".5")),
                TokenKind::Double(Arc::from("1e10")),
                TokenKind::Double(Arc::from("-1.5E-3")),
                TokenKind::Double(Arc::from("2.e3")),
            ]
        );
    }

    #[test]
    fn test_integer_before_statement_dot() {
        assert_eq!(
            kinds("30."),
            vec![TokenKind::Integer(Arc::from("30")), TokenKind::Dot]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds(". ; , ^^ { = => }"),
            vec![
                TokenKind::Dot,
                TokenKind::Semicolon,
                TokenKind::Comma,
                TokenKind::DoubleCaret,
                TokenKind::LBrace,
                TokenKind::Equals,
                TokenKind::Implies,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("ex:name # a comment\n# another\nex:value #"),
            vec![pname("ex", "name"), pname("ex", "value")]
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = tokenize("<http://example.org/s>\n  ex:p \"o\" .").unwrap();
        let positions: Vec<(i64, i64)> = tokens
            .iter()
            .map(|t| (t.position.line, t.position.column))
            .collect();
        assert_eq!(positions, vec![(1, 1), (2, 3), (2, 8), (2, 12), (2, 13)]);
    }

    #[test]
    fn test_lazy_iteration_stops_after_eof() {
        let mut lexer = Lexer::new("<a>");
        assert!(matches!(lexer.next(), Some(Ok(t)) if !t.is_eof()));
        assert!(matches!(lexer.next(), Some(Ok(t)) if t.is_eof()));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_error_points_at_offending_char() {
        let err = tokenize("ex:name $ ex:value").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unexpected character '$'"));
        assert!(msg.contains("line 1, column 9"));
        assert_eq!(err.position(), Some(TextPosition::new(1, 9)));
    }

    #[test]
    fn test_error_unterminated_string() {
        let msg = tokenize("ex:name \"unterminated").unwrap_err().to_string();
        assert!(msg.contains("unterminated string literal"));
    }

    #[test]
    fn test_error_on_later_line() {
        let err = tokenize("ex:name \"ok\" .\nex:other $ .").unwrap_err();
        assert_eq!(err.position(), Some(TextPosition::new(2, 10)));
        assert!(err.to_string().contains("2 | ex:other $ ."));
    }
}
