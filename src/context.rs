//! Script execution context
//!
//! The Context is the entry point for hosts. It owns the global scope, with
//! the builtins installed, and the record of dialogs shown by scripts.

use tracing::debug;

use crate::builtins::{self, DialogAnswers, DialogLog, DialogRecord};
use crate::error::ScriptResult;
use crate::interpreter::Interpreter;
use crate::runtime::{DEFAULT_MAX_CALL_DEPTH, Scope};
use crate::value::Value;

/// Context settings
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Deepest allowed nesting of script calls
    pub max_call_depth: usize,
    /// Answers given by `confirm`
    pub dialogs: DialogAnswers,
}

impl Default for ContextConfig {
    fn default() -> Self {
        ContextConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            dialogs: DialogAnswers::default(),
        }
    }
}

/// Script execution context
///
/// Values defined by the host or by scripts live in the global scope until
/// the context is dropped.
pub struct Context {
    global: Scope,
    dialogs: DialogLog,
}

impl Context {
    /// Create a context with default settings
    pub fn new() -> Self {
        Self::with_config(ContextConfig::default())
    }

    /// Create a context
    pub fn with_config(config: ContextConfig) -> Self {
        let global = Scope::with_max_call_depth(config.max_call_depth);
        let dialogs = DialogLog::default();
        builtins::install(&global, config.dialogs, &dialogs);
        Context { global, dialogs }
    }

    /// Evaluate one expression against the global scope
    ///
    /// Returns the dereferenced value. Tokens after the expression are not
    /// read.
    pub fn eval_expression(&self, source: &str, place: &str) -> ScriptResult<Value> {
        debug!(place, len = source.len(), "eval expression");
        Interpreter::new(source, place).evaluate_expression(&self.global)
    }

    /// Run a statement list against the global scope
    pub fn eval_statements(&self, source: &str, place: &str) -> ScriptResult<()> {
        debug!(place, len = source.len(), "eval statements");
        Interpreter::new(source, place).evaluate_statement_list(&self.global)
    }

    /// Define a global, failing if the name exists
    pub fn define(&self, name: &str, value: Value) -> ScriptResult<()> {
        self.global.define(name, value)
    }

    /// Look up a global
    pub fn get(&self, name: &str) -> ScriptResult<Value> {
        self.global.get(name)
    }

    /// Overwrite an existing global
    pub fn set(&self, name: &str, value: Value) -> ScriptResult<()> {
        self.global.set(name, value)
    }

    /// The global scope
    pub fn global(&self) -> &Scope {
        &self.global
    }

    /// Dialogs shown so far, in order
    pub fn dialog_log(&self) -> Vec<DialogRecord> {
        self.dialogs.borrow().clone()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Context {
    /// Functions hold the scope they were defined in, so every scope that
    /// a function closes over must be released explicitly.
    fn drop(&mut self) {
        self.global.release();
    }
}
