//! `alert` and `confirm`
//!
//! There is no user to ask, so `confirm` answers from a table configured by
//! the host. Every message is logged and recorded in order.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::info;

use crate::runtime::object::check_arity;
use crate::runtime::{NativeFunction, Scope};
use crate::value::Value;

/// Answers returned by `confirm`
#[derive(Debug, Clone)]
pub struct DialogAnswers {
    default: bool,
    answers: FxHashMap<String, bool>,
}

impl DialogAnswers {
    /// Answer every message with `default`
    pub fn new(default: bool) -> Self {
        DialogAnswers {
            default,
            answers: FxHashMap::default(),
        }
    }

    /// Answer one specific message differently
    pub fn with_answer(mut self, message: impl Into<String>, answer: bool) -> Self {
        self.answers.insert(message.into(), answer);
        self
    }

    pub fn answer(&self, message: &str) -> bool {
        self.answers.get(message).copied().unwrap_or(self.default)
    }
}

impl Default for DialogAnswers {
    /// Always click OK
    fn default() -> Self {
        Self::new(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Alert,
    Confirm,
}

/// One dialog shown by a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRecord {
    pub kind: DialogKind,
    pub message: String,
    /// The value returned to the script
    pub answer: bool,
}

/// Shared record of shown dialogs
pub type DialogLog = Rc<RefCell<Vec<DialogRecord>>>;

pub(crate) fn install(scope: &Scope, answers: DialogAnswers, log: &DialogLog) {
    let alert_log = Rc::clone(log);
    let alert = NativeFunction::new("alert", move |args, _scope| {
        check_arity("alert", args, &[1])?;
        let message = args[0].to_string_value()?;
        info!(%message, "alert");
        alert_log.borrow_mut().push(DialogRecord {
            kind: DialogKind::Alert,
            message,
            answer: true,
        });
        Ok(Value::Bool(true))
    });

    let confirm_log = Rc::clone(log);
    let confirm = NativeFunction::new("confirm", move |args, _scope| {
        check_arity("confirm", args, &[1])?;
        let message = args[0].to_string_value()?;
        let answer = answers.answer(&message);
        info!(%message, answer, "confirm");
        confirm_log.borrow_mut().push(DialogRecord {
            kind: DialogKind::Confirm,
            message,
            answer,
        });
        Ok(Value::Bool(answer))
    });

    scope.bind("alert", alert.into_value());
    scope.bind("confirm", confirm.into_value());
}
