//! Assignable locations
//!
//! The interpreter needs to know where a value came from to assign to it.
//! Expressions therefore yield an [`Operand`], which is either a plain value
//! or a [`Reference`] to a named slot. References are only ever held by the
//! interpreter while an expression is being evaluated; they are never stored
//! in a scope or an object.

use crate::error::{ScriptError, ScriptResult};
use crate::value::Value;

use super::scope::Scope;

/// A named slot in a scope or on an object
#[derive(Clone, Debug)]
pub enum Reference {
    /// Variable `name` in the scope that defines it
    Scope { scope: Scope, name: String },
    /// Property `name` of an object
    Member { object: Value, name: String },
}

impl Reference {
    pub fn name(&self) -> &str {
        match self {
            Reference::Scope { name, .. } | Reference::Member { name, .. } => name,
        }
    }

    /// Read the current value of the slot
    pub fn dereference(&self) -> ScriptResult<Value> {
        match self {
            Reference::Scope { scope, name } => scope.get_own(name).ok_or_else(|| {
                ScriptError::reference(format!("Variable '{}' is no longer defined", name))
            }),
            Reference::Member { object, name } => object.get_property(name),
        }
    }

    /// Write through to the slot
    pub fn set(&self, value: Value) -> ScriptResult<()> {
        match self {
            Reference::Scope { scope, name } => scope.set(name, value),
            Reference::Member { object, name } => object.set_property(name, value),
        }
    }

    /// `typeof` of the referenced value; a missing property is `"undefined"`
    pub fn type_of(&self) -> ScriptResult<String> {
        match self {
            Reference::Scope { .. } => self.dereference()?.type_of(),
            Reference::Member { object, name } => object.get_property_type(name),
        }
    }
}

/// Result of evaluating an expression
#[derive(Clone, Debug)]
pub enum Operand {
    Value(Value),
    Reference(Reference),
}

impl Operand {
    /// Dereference to a plain value
    pub fn get(&self) -> ScriptResult<Value> {
        match self {
            Operand::Value(value) => Ok(value.clone()),
            Operand::Reference(reference) => reference.dereference(),
        }
    }

    /// Assign through the operand, which must be a reference
    pub fn set_reference(&self, value: Value) -> ScriptResult<()> {
        match self {
            Operand::Reference(reference) => reference.set(value),
            Operand::Value(v) => Err(ScriptError::type_error(format!(
                "Object {} is not a reference and cannot be set",
                v.describe()
            ))),
        }
    }

    pub fn type_of(&self) -> ScriptResult<String> {
        match self {
            Operand::Value(value) => value.type_of(),
            Operand::Reference(reference) => reference.type_of(),
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

impl From<Reference> for Operand {
    fn from(reference: Reference) -> Self {
        Operand::Reference(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_reference_reads_and_writes() {
        let scope = Scope::new();
        scope.define("n", Value::Number(1.0)).unwrap();
        let operand = Operand::from(scope.find_symbol("n").unwrap());
        operand.set_reference(Value::Number(9.0)).unwrap();
        assert_eq!(operand.get().unwrap().as_number(), Some(9.0));
        assert_eq!(operand.type_of().unwrap(), "number");
    }

    #[test]
    fn test_value_is_not_assignable() {
        let operand = Operand::from(Value::Number(3.0));
        let err = operand.set_reference(Value::Null).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: Object Numeric value (3) is not a reference and cannot be set"
        );
    }

    #[test]
    fn test_missing_member_type_is_undefined() {
        let scope = Scope::new();
        let reference = Reference::Member {
            object: Value::Scope(scope),
            name: "nothing".to_string(),
        };
        assert_eq!(reference.type_of().unwrap(), "undefined");
        assert!(reference.dereference().is_err());
    }
}
