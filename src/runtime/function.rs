//! Function types
//!
//! This module implements the different callable values:
//! - Script functions, whose body is kept as source text and re-parsed on
//!   every call
//! - Native functions (Rust closures supplied by the crate or the host)
//! - Bound methods (a class method tied to the instance it was read from)

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::{ScriptError, ScriptResult};
use crate::interpreter::{Interpreter, Signal};
use crate::value::Value;

use super::class::Instance;
use super::object::ScriptObject;
use super::scope::Scope;

/// Native function signature
///
/// Native functions receive dereferenced arguments and the calling scope.
pub type NativeFn = dyn Fn(&[Value], &Scope) -> ScriptResult<Value>;

/// A function implemented in Rust
#[derive(Clone)]
pub struct NativeFunction {
    name: String,
    func: Rc<NativeFn>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value], &Scope) -> ScriptResult<Value> + 'static,
    {
        NativeFunction {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    /// Wrap as a script value
    pub fn into_value(self) -> Value {
        Value::Function(Rc::new(Function::Native(self)))
    }
}

/// A function defined by script source
#[derive(Clone)]
pub struct ScriptFunction {
    name: String,
    params: Vec<String>,
    /// Source of the body statement, re-parsed on each call
    body: Rc<str>,
    /// Scope the function was defined in
    closure: Scope,
    /// Class methods take the instance as an implicit first parameter
    is_method: bool,
}

impl ScriptFunction {
    pub fn new(
        name: impl Into<String>,
        params: Vec<String>,
        body: impl Into<Rc<str>>,
        closure: Scope,
        is_method: bool,
    ) -> Self {
        closure.capture();
        ScriptFunction {
            name: name.into(),
            params,
            body: body.into(),
            closure,
            is_method,
        }
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn is_method(&self) -> bool {
        self.is_method
    }

    /// Run the body in a fresh scope whose parent is the defining scope
    pub fn call(&self, args: &[Value], caller: &Scope) -> ScriptResult<Value> {
        if args.len() != self.params.len() {
            return Err(ScriptError::type_error(format!(
                "Arguments do not match for method '{}'",
                self.name
            )));
        }

        let scope = self.closure.call_scope(caller)?;
        for (param, arg) in self.params.iter().zip(args) {
            scope.define(param, arg.clone())?;
        }

        debug!(function = %self.name, depth = scope.call_depth(), "call");

        let place = format!("method {}", self.name);
        let mut interpreter = Interpreter::new(&self.body, &place);
        match interpreter.evaluate_statement(&scope)? {
            Some(Signal::Return(value)) => Ok(value),
            _ => Ok(Value::Null),
        }
    }
}

/// A class method bound to an instance
#[derive(Clone)]
pub struct BoundMethod {
    method: ScriptFunction,
    receiver: Rc<Instance>,
}

impl BoundMethod {
    pub fn new(method: ScriptFunction, receiver: Rc<Instance>) -> Self {
        BoundMethod { method, receiver }
    }

    pub fn call(&self, args: &[Value], caller: &Scope) -> ScriptResult<Value> {
        let mut full_args = Vec::with_capacity(args.len() + 1);
        full_args.push(Value::Instance(self.receiver.clone()));
        full_args.extend_from_slice(args);
        self.method.call(&full_args, caller)
    }
}

/// Callable value
#[derive(Clone)]
pub enum Function {
    Script(ScriptFunction),
    Native(NativeFunction),
    Bound(BoundMethod),
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Function::Script(f) => &f.name,
            Function::Native(f) => &f.name,
            Function::Bound(f) => &f.method.name,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name())
    }
}

impl ScriptObject for Function {
    fn describe(&self) -> String {
        format!("Method '{}'", self.name())
    }

    fn type_of(&self) -> ScriptResult<String> {
        Ok("function".to_string())
    }

    fn call(&self, args: &[Value], scope: &Scope) -> ScriptResult<Value> {
        match self {
            Function::Script(f) => f.call(args, scope),
            Function::Native(f) => (f.func)(args, scope),
            Function::Bound(f) => f.call(args, scope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_function() {
        let double = NativeFunction::new("double", |args, _| {
            Ok(Value::Number(args[0].to_number_value()? * 2.0))
        })
        .into_value();
        let result = double.call(&[Value::Number(4.0)], &Scope::new()).unwrap();
        assert_eq!(result.as_number(), Some(8.0));
        assert_eq!(double.type_of().unwrap(), "function");
    }

    #[test]
    fn test_script_function_returns() {
        let scope = Scope::new();
        let f = ScriptFunction::new("add", vec!["a".into(), "b".into()], " { return a + b; }", scope.clone(), false);
        let result = f.call(&[Value::Number(1.0), Value::Number(2.0)], &scope).unwrap();
        assert_eq!(result.as_number(), Some(3.0));
    }

    #[test]
    fn test_no_return_yields_null() {
        let scope = Scope::new();
        let f = ScriptFunction::new("noop", vec![], "{ }", scope.clone(), false);
        assert!(matches!(f.call(&[], &scope).unwrap(), Value::Null));
    }

    #[test]
    fn test_arity_mismatch() {
        let scope = Scope::new();
        let f = ScriptFunction::new("one", vec!["a".into()], "{ }", scope.clone(), false);
        let err = f.call(&[], &scope).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: Arguments do not match for method 'one'");
    }

    #[test]
    fn test_recursion_limit() {
        let scope = Scope::with_max_call_depth(8);
        let f = ScriptFunction::new("f", vec![], "{ return f(); }", scope.clone(), false);
        scope
            .define("f", Value::Function(Rc::new(Function::Script(f))))
            .unwrap();
        let f = scope.get("f").unwrap();
        assert!(matches!(
            f.call(&[], &scope),
            Err(ScriptError::CallDepth { limit: 8 })
        ));
        scope.clear();
    }
}
