//! Parser engine: one-token lookahead over the lexer and the single error
//! path every grammar raises through.

use std::sync::Arc;

use brook_graph_ir::TextPosition;

use crate::error::{Result, TurtleError};
use crate::handler::ErrorHandler;
use crate::lex::{Lexer, Token, TokenKind};

/// Token source with lookahead, position tracking and error reporting.
///
/// Errors are reported to the [`ErrorHandler`] at the moment they are raised
/// and then returned for the grammar to propagate with `?`. There is no
/// recovery: the first error ends the parse.
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    lookahead: Option<Token>,
    /// Position of the last consumed token
    position: TextPosition,
    handler: Arc<dyn ErrorHandler>,
}

impl<'a> TokenStream<'a> {
    pub fn new(input: &'a str, handler: Arc<dyn ErrorHandler>) -> Self {
        Self {
            lexer: Lexer::new(input),
            lookahead: None,
            position: TextPosition::new(1, 1),
            handler,
        }
    }

    /// The next token, without consuming it.
    ///
    /// Once the input is exhausted this keeps returning the same EOF token.
    pub fn peek(&mut self) -> Result<&Token> {
        if self.lookahead.is_none() {
            let token = match self.lexer.next() {
                Some(Ok(token)) => token,
                Some(Err(err)) => return Err(self.fail(err)),
                None => Token::new(TokenKind::Eof, 0, 0, self.position),
            };
            self.lookahead = Some(token);
        }
        self.lookahead
            .as_ref()
            .ok_or_else(|| TurtleError::parse(self.position, "token stream exhausted"))
    }

    /// Consume and return the next token, recording its position.
    pub fn next(&mut self) -> Result<Token> {
        self.peek()?;
        let token = self
            .lookahead
            .take()
            .ok_or_else(|| TurtleError::parse(self.position, "token stream exhausted"))?;
        self.position = token.position;
        if token.is_eof() {
            self.lookahead = Some(token.clone());
        }
        Ok(token)
    }

    /// Whether the input is exhausted.
    pub fn eof(&mut self) -> Result<bool> {
        Ok(self.peek()?.is_eof())
    }

    /// Whether the lookahead has the given kind.
    pub fn check(&mut self, kind: &TokenKind) -> Result<bool> {
        Ok(self.peek()?.is(kind))
    }

    /// Consume a token of the given kind, or raise.
    pub fn expect(&mut self, kind: &TokenKind) -> Result<Token> {
        if self.check(kind)? {
            self.next()
        } else {
            Err(self.unexpected(&format!("'{}'", kind)))
        }
    }

    /// Consume the lookahead only if it has the given kind.
    pub fn skip_if(&mut self, kind: &TokenKind) -> Result<bool> {
        if self.check(kind)? {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Position of the last consumed token.
    pub fn position(&self) -> TextPosition {
        self.position
    }

    /// Report a syntax error at the current position and return it.
    pub fn raise(&self, message: impl Into<String>) -> TurtleError {
        self.fail(TurtleError::parse(self.position, message))
    }

    /// Report a syntax error naming what was expected instead of the
    /// lookahead, positioned at the lookahead.
    pub fn unexpected(&mut self, expected: &str) -> TurtleError {
        match self.peek() {
            Ok(token) => {
                let err = TurtleError::parse(
                    token.position,
                    format!("expected {}, found {}", expected, token.kind),
                );
                self.fail(err)
            }
            Err(err) => err,
        }
    }

    /// Report an error from elsewhere (term factory, lexer), attaching the
    /// current position if it has none. Sink errors pass through unreported.
    pub fn fail(&self, err: TurtleError) -> TurtleError {
        if !err.is_syntax() {
            return err;
        }
        let err = err.at(self.position);
        let position = err.position().unwrap_or(self.position);
        self.handler.error(&err.to_string(), position);
        err
    }

    /// Report a warning at the current position.
    pub fn warn(&self, message: &str) {
        self.handler.warning(message, self.position);
    }
}
