//! Object protocol
//!
//! Every non-primitive value implements [`ScriptObject`]. Each operation has
//! a default that fails with a `TypeError` naming the object, so an
//! implementation only overrides what its kind supports. Hosts implement the
//! trait to expose their own objects (see [`crate::Value::Host`]).

use crate::error::{ScriptError, ScriptResult};
use crate::value::Value;

use super::scope::Scope;

/// Operations scripts can perform on an object
pub trait ScriptObject {
    /// Human-readable description used in error messages
    fn describe(&self) -> String;

    /// Result of the `typeof` operator
    fn type_of(&self) -> ScriptResult<String> {
        Err(no_value(&self.describe(), "type"))
    }

    /// Call the object with already dereferenced arguments
    fn call(&self, _args: &[Value], _scope: &Scope) -> ScriptResult<Value> {
        Err(ScriptError::type_error(format!(
            "Attempt to evaluate a non-method object: {}",
            self.describe()
        )))
    }

    /// Instantiate the object with `new`
    fn construct(&self, _args: &[Value], _scope: &Scope) -> ScriptResult<Value> {
        Err(ScriptError::type_error(format!(
            "Attempt to construct a non-class object: {}",
            self.describe()
        )))
    }

    /// `typeof` of a property, `"undefined"` when it does not exist
    fn get_property_type(&self, name: &str) -> ScriptResult<String> {
        match self.get_property(name) {
            Ok(value) => value.type_of(),
            Err(_) => Ok("undefined".to_string()),
        }
    }

    fn get_property(&self, name: &str) -> ScriptResult<Value> {
        Err(no_such_property(&self.describe(), name))
    }

    fn set_property(&self, name: &str, _value: Value) -> ScriptResult<()> {
        Err(no_such_property(&self.describe(), name))
    }

    fn to_string_value(&self) -> ScriptResult<String> {
        Err(no_value(&self.describe(), "string"))
    }

    fn to_number_value(&self) -> ScriptResult<f64> {
        Err(no_value(&self.describe(), "numeric"))
    }

    fn to_bool_value(&self) -> ScriptResult<bool> {
        Err(no_value(&self.describe(), "boolean"))
    }
}

pub(crate) fn no_such_property(description: &str, name: &str) -> ScriptError {
    ScriptError::type_error(format!(
        "Object {} has no such property '{}'",
        description, name
    ))
}

pub(crate) fn no_value(description: &str, kind: &str) -> ScriptError {
    ScriptError::type_error(format!("Object {} has no {} value", description, kind))
}

/// Check an argument list length against what a method accepts
pub(crate) fn check_arity(name: &str, args: &[Value], allowed: &[usize]) -> ScriptResult<()> {
    if allowed.contains(&args.len()) {
        Ok(())
    } else {
        Err(ScriptError::type_error(format!(
            "Arguments do not match for method '{}'",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Opaque;

    impl ScriptObject for Opaque {
        fn describe(&self) -> String {
            "Opaque thing".to_string()
        }
    }

    #[test]
    fn test_defaults_are_type_errors() {
        let scope = Scope::new();
        let err = Opaque.call(&[], &scope).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: Attempt to evaluate a non-method object: Opaque thing"
        );
        assert!(matches!(Opaque.construct(&[], &scope), Err(ScriptError::Type(_))));
        assert!(Opaque.to_number_value().is_err());
        assert_eq!(
            Opaque.get_property("x").unwrap_err().to_string(),
            "TypeError: Object Opaque thing has no such property 'x'"
        );
    }

    #[test]
    fn test_missing_property_type_is_undefined() {
        assert_eq!(Opaque.get_property_type("x").unwrap(), "undefined");
    }

    #[test]
    fn test_check_arity() {
        assert!(check_arity("f", &[Value::Null], &[1, 2]).is_ok());
        assert!(check_arity("f", &[], &[1]).is_err());
    }
}
