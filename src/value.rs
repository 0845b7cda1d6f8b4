//! Script value representation
//!
//! `Value` is a closed set of kinds. Primitives (undefined, null, booleans,
//! numbers and strings) are handled inline. Numbers come in two
//! representations, `Int` and `Number`, which are the same kind to scripts;
//! arithmetic between two `Int`s stays integral. Every other kind carries
//! a shared handle to a type implementing [`ScriptObject`], and the methods
//! on `Value` dispatch to it. Cloning a value is cheap and clones of an
//! object value share the same object.

use std::fmt;
use std::rc::Rc;

use crate::error::{ScriptError, ScriptResult};
use crate::runtime::object::{ScriptObject, no_value};
use crate::runtime::{ArrayObject, Class, Function, Instance, RegExpObject, Scope, string};
use crate::util::{format_number, parse_number};

/// Kind of a [`Value`], for type tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Array,
    RegExp,
    Scope,
    Function,
    Class,
    Instance,
    Host,
}

/// Script value
#[derive(Clone)]
pub enum Value {
    /// Value of a declared but unassigned variable
    Undefined,
    Null,
    Bool(bool),
    /// Integral number, produced by integer literals and integer arithmetic
    Int(i64),
    Number(f64),
    String(Rc<str>),
    Array(Rc<ArrayObject>),
    RegExp(Rc<RegExpObject>),
    Scope(Scope),
    Function(Rc<Function>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    /// Object supplied by the embedding host
    Host(Rc<dyn ScriptObject>),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// An integral `f64` as `Int` when it fits, otherwise unchanged
    pub(crate) fn integral(n: f64) -> Self {
        if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
            Value::Int(n as i64)
        } else {
            Value::Number(n)
        }
    }

    /// Wrap a host object
    pub fn host<T: ScriptObject + 'static>(object: T) -> Self {
        Value::Host(Rc::new(object))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Int(_) | Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::RegExp(_) => ValueKind::RegExp,
            Value::Scope(_) => ValueKind::Scope,
            Value::Function(_) => ValueKind::Function,
            Value::Class(_) => ValueKind::Class,
            Value::Instance(_) => ValueKind::Instance,
            Value::Host(_) => ValueKind::Host,
        }
    }

    #[inline]
    pub fn is_type(&self, kind: ValueKind) -> bool {
        self.kind() == kind
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The number, if this is a numeric value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The object behind a non-primitive value
    fn as_object(&self) -> Option<&dyn ScriptObject> {
        match self {
            Value::Array(o) => Some(o.as_ref()),
            Value::RegExp(o) => Some(o.as_ref()),
            Value::Scope(o) => Some(o),
            Value::Function(o) => Some(o.as_ref()),
            Value::Class(o) => Some(o.as_ref()),
            Value::Instance(o) => Some(o.as_ref()),
            Value::Host(o) => Some(o.as_ref()),
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Number(_)
            | Value::String(_) => None,
        }
    }

    /// Description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Value::Undefined => "Undefined value".to_string(),
            Value::Null => "Null value".to_string(),
            Value::Bool(b) => format!("Boolean '{}' value", b),
            Value::Int(i) => format!("Numeric value ({})", i),
            Value::Number(n) => format!("Numeric value ({})", format_number(*n)),
            Value::String(s) => string::describe(s),
            _ => self.as_object().map(|o| o.describe()).unwrap_or_default(),
        }
    }

    /// Result of the `typeof` operator
    pub fn type_of(&self) -> ScriptResult<String> {
        let name = match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Number(_) => "number",
            Value::String(_) => "string",
            _ => return self.object()?.type_of(),
        };
        Ok(name.to_string())
    }

    fn object(&self) -> ScriptResult<&dyn ScriptObject> {
        self.as_object()
            .ok_or_else(|| no_value(&self.describe(), "object"))
    }

    /// Call the value with dereferenced arguments
    pub fn call(&self, args: &[Value], scope: &Scope) -> ScriptResult<Value> {
        match self.as_object() {
            Some(object) => object.call(args, scope),
            None => Err(ScriptError::type_error(format!(
                "Attempt to evaluate a non-method object: {}",
                self.describe()
            ))),
        }
    }

    /// Instantiate the value with `new`
    pub fn construct(&self, args: &[Value], scope: &Scope) -> ScriptResult<Value> {
        match self.as_object() {
            Some(object) => object.construct(args, scope),
            None => Err(ScriptError::type_error(format!(
                "Attempt to construct a non-class object: {}",
                self.describe()
            ))),
        }
    }

    /// `typeof` of a property, `"undefined"` when it does not exist
    pub fn get_property_type(&self, name: &str) -> ScriptResult<String> {
        match self {
            Value::String(_) if name == "length" => Ok("number".to_string()),
            Value::String(_) if string::STRING_PROPERTIES.contains(&name) => {
                Ok("function".to_string())
            }
            _ => match self.as_object() {
                Some(object) => object.get_property_type(name),
                None => Ok("undefined".to_string()),
            },
        }
    }

    pub fn get_property(&self, name: &str) -> ScriptResult<Value> {
        match self {
            Value::String(s) => string::get_property(s, name),
            Value::Instance(instance) => instance.bound_member(name),
            _ => match self.as_object() {
                Some(object) => object.get_property(name),
                None => Err(crate::runtime::object::no_such_property(
                    &self.describe(),
                    name,
                )),
            },
        }
    }

    pub fn set_property(&self, name: &str, value: Value) -> ScriptResult<()> {
        match self.as_object() {
            Some(object) => object.set_property(name, value),
            None => Err(crate::runtime::object::no_such_property(
                &self.describe(),
                name,
            )),
        }
    }

    /// Convert to a string, as for concatenation
    pub fn to_string_value(&self) -> ScriptResult<String> {
        match self {
            Value::Undefined => Ok("undefined".to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Number(n) => Ok(format_number(*n)),
            Value::String(s) => Ok(s.to_string()),
            Value::Null => Err(no_value(&self.describe(), "string")),
            _ => self.object()?.to_string_value(),
        }
    }

    /// Convert to a number; strings must parse completely
    pub fn to_number_value(&self) -> ScriptResult<f64> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Number(n) => Ok(*n),
            Value::String(s) => parse_number(s).ok_or_else(|| no_value(&self.describe(), "numeric")),
            Value::Undefined | Value::Null | Value::Bool(_) => {
                Err(no_value(&self.describe(), "numeric"))
            }
            _ => self.object()?.to_number_value(),
        }
    }

    /// Convert to an integer, truncating toward zero
    pub fn to_integer_value(&self) -> ScriptResult<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            _ => Ok(self.to_number_value()? as i64),
        }
    }

    /// Convert to a boolean, as for conditions
    pub fn to_bool_value(&self) -> ScriptResult<bool> {
        match self {
            Value::Undefined | Value::Null => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Number(n) => Ok(*n != 0.0 && !n.is_nan()),
            Value::String(s) => Ok(!s.is_empty()),
            _ => self.object()?.to_bool_value(),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{:?}", s),
            _ => write!(f, "<{}>", self.describe()),
        }
    }
}

/// Script-visible form where one exists, otherwise the description
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            _ => match self.to_string_value() {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "{}", self.describe()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_of() {
        assert_eq!(Value::Undefined.type_of().unwrap(), "undefined");
        assert_eq!(Value::Null.type_of().unwrap(), "object");
        assert_eq!(Value::Bool(true).type_of().unwrap(), "boolean");
        assert_eq!(Value::Number(1.0).type_of().unwrap(), "number");
        assert_eq!(Value::string("s").type_of().unwrap(), "string");
        assert_eq!(Value::Scope(Scope::new()).type_of().unwrap(), "object");
    }

    #[test]
    fn test_describe() {
        assert_eq!(Value::Number(5.0).describe(), "Numeric value (5)");
        assert_eq!(Value::string("abc").describe(), "String value (abc)");
        assert_eq!(Value::Null.describe(), "Null value");
        assert_eq!(Value::Bool(true).describe(), "Boolean 'true' value");
    }

    #[test]
    fn test_string_coercion() {
        assert_eq!(Value::Number(8.0).to_string_value().unwrap(), "8");
        assert_eq!(Value::Number(0.5).to_string_value().unwrap(), "0.5");
        assert_eq!(Value::Undefined.to_string_value().unwrap(), "undefined");
        assert!(Value::Null.to_string_value().is_err());
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(Value::string(" 12 ").to_number_value().unwrap(), 12.0);
        let err = Value::string("twelve").to_number_value().unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: Object String value (twelve) has no numeric value"
        );
        assert!(Value::Bool(true).to_number_value().is_err());
    }

    #[test]
    fn test_integers_are_numbers() {
        let seven = Value::from(7i64);
        assert!(seven.is_type(ValueKind::Number));
        assert_eq!(seven.type_of().unwrap(), "number");
        assert_eq!(seven.as_number(), Some(7.0));
        assert_eq!(seven.to_string_value().unwrap(), "7");
        assert_eq!(seven.describe(), "Numeric value (7)");
        assert!(!Value::Int(0).to_bool_value().unwrap());

        assert!(matches!(Value::integral(3.0), Value::Int(3)));
        assert!(matches!(Value::integral(2.5), Value::Number(_)));
        assert!(matches!(Value::integral(f64::NAN), Value::Number(_)));
    }

    #[test]
    fn test_bool_coercion() {
        assert!(!Value::Null.to_bool_value().unwrap());
        assert!(!Value::Undefined.to_bool_value().unwrap());
        assert!(!Value::Number(0.0).to_bool_value().unwrap());
        assert!(Value::string("x").to_bool_value().unwrap());
        assert!(Value::Array(Rc::new(ArrayObject::new(0))).to_bool_value().is_err());
    }

    #[test]
    fn test_primitives_are_not_callable() {
        let err = Value::Number(1.0).call(&[], &Scope::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: Attempt to evaluate a non-method object: Numeric value (1)"
        );
        assert!(Value::Null.construct(&[], &Scope::new()).is_err());
    }

    #[test]
    fn test_property_types() {
        let s = Value::string("abc");
        assert_eq!(s.get_property_type("length").unwrap(), "number");
        assert_eq!(s.get_property_type("split").unwrap(), "function");
        assert_eq!(s.get_property_type("nothing").unwrap(), "undefined");
        assert_eq!(Value::Null.get_property_type("x").unwrap(), "undefined");
        assert!(Value::Null.get_property("x").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(
            Value::Array(Rc::new(ArrayObject::new(2))).to_string(),
            "Array of 2 items"
        );
    }
}
