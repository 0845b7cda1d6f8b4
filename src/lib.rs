//! formscript - a small interpreter for the scripts of simulated web forms
//!
//! Form pages drive their behavior with short scripts written in a subset of
//! JavaScript. This crate runs them without a browser: source is parsed and
//! executed in one pass, function bodies are kept as text and re-parsed on
//! every call, and host objects plug into the global scope through the
//! [`ScriptObject`] trait.
//!
//! # Features
//! - `var`, `if`/`else`, `while`, `for`, `break`/`continue`/`return`
//! - Functions, closures and simple classes with `new`
//! - `try`/`catch`/`finally` that runs every clause and catches nothing
//! - Strings, numbers, fixed-size arrays and regular expression literals
//! - `alert`, `confirm`, `eval` and `parseInt` builtins
//!
//! # Example
//! ```
//! use formscript::Context;
//!
//! let ctx = Context::new();
//! ctx.eval_statements("var total = 0; for (var i = 1; i <= 4; i++) total += i;", "example")
//!     .unwrap();
//! let result = ctx.eval_expression("'total=' + total", "example").unwrap();
//! assert_eq!(result.to_string_value().unwrap(), "total=10");
//! ```

// Core modules
pub mod context;
pub mod error;
pub mod value;

// Parsing and execution
pub mod interpreter;
pub mod parser;

// Object kinds and host builtins
pub mod builtins;
pub mod runtime;

// Utilities
pub mod util;

// Re-export main types
pub use builtins::{DialogAnswers, DialogKind, DialogRecord};
pub use context::{Context, ContextConfig};
pub use error::{ScriptError, ScriptResult};
pub use interpreter::{Interpreter, Signal};
pub use runtime::{NativeFunction, Reference, ScriptObject, Scope};
pub use value::{Value, ValueKind};
