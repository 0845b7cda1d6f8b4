//! Host builtins
//!
//! These are the functions every [`Context`](crate::Context) installs in its
//! global scope:
//! - `alert` and `confirm`, which record dialog messages ([`dialog`])
//! - `eval` and `parseInt` ([`global`])

pub mod dialog;
pub mod global;

pub use dialog::{DialogAnswers, DialogKind, DialogLog, DialogRecord};

use crate::runtime::Scope;

/// Bind every builtin in `scope`, replacing any existing binding
pub fn install(scope: &Scope, answers: DialogAnswers, log: &DialogLog) {
    dialog::install(scope, answers, log);
    global::install(scope);
}
