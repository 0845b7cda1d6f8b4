//! Script error type
//!
//! Every failure inside the interpreter aborts the current evaluation and
//! surfaces to the host as a [`ScriptError`]. The variants only classify the
//! message; hosts are expected to treat all of them as fatal.

use thiserror::Error;

/// Error from script evaluation
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Malformed source: unexpected end of input, missing punctuation,
    /// bad function/class/catch clauses
    #[error("SyntaxError: {0}")]
    Syntax(String),

    /// An operation the value kind does not support, or a bad argument list
    #[error("TypeError: {0}")]
    Type(String),

    /// Unknown symbol, duplicate definition, or a write to an undefined name
    #[error("ReferenceError: {0}")]
    Reference(String),

    /// Index outside a fixed-size array
    #[error("RangeError: {0}")]
    Range(String),

    /// The host regex compiler rejected a pattern
    #[error("RegexError: {0}")]
    Regex(#[from] regex::Error),

    /// Calls nested deeper than the configured limit
    #[error("InternalError: maximum call depth of {limit} exceeded")]
    CallDepth { limit: usize },
}

impl ScriptError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        ScriptError::Syntax(message.into())
    }

    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        ScriptError::Type(message.into())
    }

    pub(crate) fn reference(message: impl Into<String>) -> Self {
        ScriptError::Reference(message.into())
    }
}

/// Result type for script operations
pub type ScriptResult<T> = Result<T, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            ScriptError::syntax("Expecting ';'").to_string(),
            "SyntaxError: Expecting ';'"
        );
        assert_eq!(
            ScriptError::reference("No such variable or method: x").to_string(),
            "ReferenceError: No such variable or method: x"
        );
        assert_eq!(
            ScriptError::CallDepth { limit: 4 }.to_string(),
            "InternalError: maximum call depth of 4 exceeded"
        );
    }

    #[test]
    fn test_regex_error_converts() {
        let err: ScriptError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, ScriptError::Regex(_)));
    }
}
