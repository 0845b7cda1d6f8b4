//! Token stream cursor
//!
//! Wraps a [`Lexer`] with a one-token lookahead cache and seekable
//! positions. Loops re-run their condition by seeking back to a saved
//! position, and function definitions capture their body as a slice of the
//! original source between two positions.

use crate::error::{ScriptError, ScriptResult};

use super::lexer::{Lexer, Punct, SourcePos, Token};

/// Seekable cursor over script tokens
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    /// Offset just past the last consumed token
    current_position: usize,
    /// Token cached by the last peek
    current: Option<Token>,
}

impl<'a> TokenStream<'a> {
    /// Create a stream positioned at the start of `source`
    pub fn new(source: &'a str) -> Self {
        TokenStream {
            lexer: Lexer::new(source),
            current_position: 0,
            current: None,
        }
    }

    /// Peek at the next token in operand position (a `/` starts a regex)
    pub fn peek(&mut self) -> ScriptResult<Option<&Token>> {
        self.peek_with(false)
    }

    /// Peek at the next token in operator position (a `/` is division)
    pub fn peek_operator(&mut self) -> ScriptResult<Option<&Token>> {
        self.peek_with(true)
    }

    /// Once a token is cached, the slash hint of later peeks is ignored
    fn peek_with(&mut self, slash_is_legal: bool) -> ScriptResult<Option<&Token>> {
        if self.current.is_none() {
            self.current = self.lexer.next_token(slash_is_legal)?;
        }
        Ok(self.current.as_ref())
    }

    /// Consume the cached token
    pub fn advance(&mut self) {
        self.current = None;
        self.current_position = self.lexer.position();
    }

    /// Offset just past the last consumed token
    #[inline]
    pub fn position(&self) -> usize {
        self.current_position
    }

    /// Seek to an offset previously obtained from [`TokenStream::position`]
    pub fn set_position(&mut self, position: usize) {
        self.lexer.set_position(position);
        self.current_position = position;
        self.current = None;
    }

    /// Source text between `start` and the current position
    pub fn chunk(&self, start: usize) -> &'a str {
        self.lexer
            .source()
            .get(start..self.current_position)
            .unwrap_or("")
    }

    /// Line and column of the current position
    pub fn location(&self) -> SourcePos {
        SourcePos::locate(self.lexer.source(), self.current_position)
    }

    /// Check whether the next token is the given punctuation
    pub fn check(&mut self, punct: Punct) -> ScriptResult<bool> {
        Ok(self.peek()?.is_some_and(|t| t.is_punct(punct)))
    }

    /// Consume the next token if it is the given punctuation
    pub fn eat(&mut self, punct: Punct) -> ScriptResult<bool> {
        let found = self.check(punct)?;
        if found {
            self.advance();
        }
        Ok(found)
    }

    /// Check whether the next token is the given keyword
    pub fn check_keyword(&mut self, keyword: &str) -> ScriptResult<bool> {
        Ok(self.peek()?.is_some_and(|t| t.is_ident(keyword)))
    }

    /// Consume the next token if it is the given keyword
    pub fn eat_keyword(&mut self, keyword: &str) -> ScriptResult<bool> {
        let found = self.check_keyword(keyword)?;
        if found {
            self.advance();
        }
        Ok(found)
    }

    /// Consume and return an identifier, if the next token is one
    pub fn eat_ident(&mut self) -> ScriptResult<Option<String>> {
        let Some(name) = self.peek()?.and_then(Token::ident).map(str::to_string) else {
            return Ok(None);
        };
        self.advance();
        Ok(Some(name))
    }

    /// Describe the next token for an error message
    pub fn describe_next(&mut self) -> String {
        match self.peek() {
            Ok(Some(token)) => token.describe(),
            Ok(None) => "end of input".to_string(),
            Err(e) => e.to_string(),
        }
    }

    /// Build a syntax error that names the current location
    pub fn error(&self, message: impl std::fmt::Display, place: &str) -> ScriptError {
        ScriptError::syntax(format!("{} in {} at {}", message, place, self.location()))
    }
}
