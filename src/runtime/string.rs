//! String methods
//!
//! Strings are immutable, so their methods are computed on access: reading
//! `s.indexOf` yields a native function that has captured `s`. Indices are
//! counted in characters, not bytes.

use std::rc::Rc;

use crate::error::{ScriptError, ScriptResult};
use crate::util::{char_index, char_slice};
use crate::value::{Value, ValueKind};

use super::array::ArrayObject;
use super::function::NativeFunction;
use super::object::{check_arity, no_such_property};

/// Names of the properties strings support
pub const STRING_PROPERTIES: &[&str] = &[
    "length",
    "indexOf",
    "charAt",
    "search",
    "replace",
    "split",
    "substring",
];

/// Read a property of a string value
pub fn get_property(s: &Rc<str>, name: &str) -> ScriptResult<Value> {
    let s = s.clone();
    let method = match name {
        "length" => return Ok(Value::Int(s.chars().count() as i64)),
        "indexOf" => NativeFunction::new(name, move |args, _| index_of(&s, args)),
        "charAt" => NativeFunction::new(name, move |args, _| char_at(&s, args)),
        "search" => NativeFunction::new(name, move |args, _| search(&s, args)),
        "replace" => NativeFunction::new(name, move |args, _| replace(&s, args)),
        "split" => NativeFunction::new(name, move |args, _| split(&s, args)),
        "substring" => NativeFunction::new(name, move |args, _| substring(&s, args)),
        _ => return Err(no_such_property(&describe(&s), name)),
    };
    Ok(method.into_value())
}

pub fn describe(s: &str) -> String {
    format!("String value ({})", s)
}

fn bad_arguments(method: &str) -> ScriptError {
    ScriptError::type_error(format!("Arguments do not match for method '{}'", method))
}

fn string_arg(method: &str, arg: &Value) -> ScriptResult<Rc<str>> {
    match arg {
        Value::String(s) => Ok(s.clone()),
        _ => Err(bad_arguments(method)),
    }
}

fn index_arg(method: &str, arg: &Value) -> ScriptResult<i64> {
    if !arg.is_type(ValueKind::Number) {
        return Err(bad_arguments(method));
    }
    arg.to_integer_value()
}

fn index_of(s: &str, args: &[Value]) -> ScriptResult<Value> {
    check_arity("indexOf", args, &[1])?;
    let needle = string_arg("indexOf", &args[0])?;
    let index = s.find(&*needle).map_or(-1, |b| char_index(s, b) as i64);
    Ok(Value::Int(index))
}

fn char_at(s: &str, args: &[Value]) -> ScriptResult<Value> {
    check_arity("charAt", args, &[1])?;
    let index = index_arg("charAt", &args[0])?;
    usize::try_from(index)
        .ok()
        .and_then(|i| s.chars().nth(i))
        .map(|c| Value::String(Rc::from(c.to_string())))
        .ok_or_else(|| {
            ScriptError::Range(format!("Character index {} out of range for {}", index, describe(s)))
        })
}

/// A string argument finds its position; a regexp only matches at the start
fn search(s: &str, args: &[Value]) -> ScriptResult<Value> {
    check_arity("search", args, &[1])?;
    let index = match &args[0] {
        Value::String(needle) => s.find(&**needle).map_or(-1, |b| char_index(s, b) as i64),
        Value::RegExp(re) => {
            if re.matches_at_start(s)? {
                0
            } else {
                -1
            }
        }
        _ => return Err(bad_arguments("search")),
    };
    Ok(Value::Int(index))
}

fn replace(s: &str, args: &[Value]) -> ScriptResult<Value> {
    check_arity("replace", args, &[2])?;
    let Value::RegExp(re) = &args[0] else {
        return Err(bad_arguments("replace"));
    };
    let replacement = string_arg("replace", &args[1])?;
    Ok(Value::String(Rc::from(re.replace_all(s, &replacement)?)))
}

fn split(s: &str, args: &[Value]) -> ScriptResult<Value> {
    check_arity("split", args, &[1])?;
    let separator = string_arg("split", &args[0])?;
    if separator.is_empty() {
        return Err(ScriptError::type_error("Empty separator passed to split"));
    }
    let parts = s
        .split(&*separator)
        .map(|part| Value::String(Rc::from(part)))
        .collect();
    Ok(Value::Array(Rc::new(ArrayObject::from_values(parts))))
}

/// Negative indices clamp to zero and the end defaults to the length
fn substring(s: &str, args: &[Value]) -> ScriptResult<Value> {
    check_arity("substring", args, &[1, 2])?;
    let clamp = |i: i64| usize::try_from(i).unwrap_or(0);
    let start = clamp(index_arg("substring", &args[0])?);
    let end = match args.get(1) {
        Some(arg) => clamp(index_arg("substring", arg)?),
        None => usize::MAX,
    };
    Ok(Value::String(Rc::from(char_slice(s, start, end))))
}
