//! Script interpreter
//!
//! There is no separate compile step: an [`Interpreter`] walks the token
//! stream and executes as it parses. Code that must not run (untaken
//! branches, short-circuited operands, function bodies being recorded) is
//! scanned in the same pass without side effects.
//!
//! Function bodies are stored as source text, and every call runs a new
//! `Interpreter` over that text.

mod expr;
mod operators;
mod stmt;

use tracing::debug;

use crate::error::{ScriptError, ScriptResult};
use crate::parser::{Punct, TokenStream};
use crate::runtime::Scope;
use crate::value::Value;

/// Control-flow signal produced by a statement
#[derive(Debug, Clone)]
pub enum Signal {
    Break,
    Continue,
    Return(Value),
}

/// Whether expressions are evaluated or only scanned
#[derive(Clone, Copy)]
pub(crate) enum Mode<'s> {
    /// Evaluate against a scope
    Eval(&'s Scope),
    /// Consume tokens without side effects
    Scan,
}

impl Mode<'_> {
    #[inline]
    pub(crate) fn is_eval(&self) -> bool {
        matches!(self, Mode::Eval(_))
    }
}

/// Parse-and-execute interpreter over one source text
pub struct Interpreter<'a> {
    tokens: TokenStream<'a>,
    /// Names the code being run in diagnostics
    place: &'a str,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter positioned at the start of `source`
    pub fn new(source: &'a str, place: &'a str) -> Self {
        Interpreter {
            tokens: TokenStream::new(source),
            place,
        }
    }

    /// Evaluate one expression and return its dereferenced value
    ///
    /// Tokens after the expression are left unread.
    pub fn evaluate_expression(&mut self, scope: &Scope) -> ScriptResult<Value> {
        debug!(place = self.place, "evaluate expression");
        match self.expression(Mode::Eval(scope))? {
            Some(operand) => operand.get(),
            None => Err(self.unexpected("Expected an expression")),
        }
    }

    /// Run statements until end of input
    ///
    /// A `break`, `continue` or `return` at this level does not stop the
    /// list; the next statement runs.
    pub fn evaluate_statement_list(&mut self, scope: &Scope) -> ScriptResult<()> {
        debug!(place = self.place, "evaluate statements");
        while self.tokens.peek()?.is_some() {
            self.evaluate_statement(scope)?;
        }
        Ok(())
    }

    /// Error naming the token found instead of what was expected
    fn unexpected(&mut self, message: &str) -> ScriptError {
        let found = self.tokens.describe_next();
        self.tokens
            .error(format!("{}, saw {}", message, found), self.place)
    }

    /// Consume `punct` or fail with `message`
    fn expect(&mut self, punct: Punct, message: &str) -> ScriptResult<()> {
        if self.tokens.eat(punct)? {
            Ok(())
        } else {
            Err(self.unexpected(message))
        }
    }
}
