//! `eval` and `parseInt`

use crate::error::ScriptResult;
use crate::interpreter::Interpreter;
use crate::runtime::object::check_arity;
use crate::runtime::{NativeFunction, Scope};
use crate::util::parse_leading_int;
use crate::value::Value;

pub(crate) fn install(scope: &Scope) {
    scope.bind("eval", NativeFunction::new("eval", eval).into_value());
    scope.bind("parseInt", NativeFunction::new("parseInt", parse_int).into_value());
}

/// Evaluate the argument as an expression in the calling scope
fn eval(args: &[Value], scope: &Scope) -> ScriptResult<Value> {
    check_arity("eval", args, &[1])?;
    let source = args[0].to_string_value()?;
    Interpreter::new(&source, "Eval").evaluate_expression(scope)
}

/// Integer part of a number, or the leading integer of a string; NaN otherwise
fn parse_int(args: &[Value], _scope: &Scope) -> ScriptResult<Value> {
    check_arity("parseInt", args, &[1])?;
    let n = match &args[0] {
        Value::Int(i) => return Ok(Value::Int(*i)),
        Value::Number(n) => n.trunc(),
        Value::String(s) => parse_leading_int(s).unwrap_or(f64::NAN),
        _ => f64::NAN,
    };
    Ok(Value::integral(n))
}
