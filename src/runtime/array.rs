//! Fixed-size arrays
//!
//! Arrays are created by the host (or by `split`) with a fixed length and
//! every slot initialized. Scripts index them with numeric property names;
//! the length can be read but never changed.

use std::cell::RefCell;

use crate::error::{ScriptError, ScriptResult};
use crate::value::Value;

use super::object::{ScriptObject, no_such_property};

/// Script array with a fixed length
#[derive(Debug)]
pub struct ArrayObject {
    elements: RefCell<Vec<Value>>,
}

impl ArrayObject {
    /// Create an array of `len` nulls
    pub fn new(len: usize) -> Self {
        ArrayObject {
            elements: RefCell::new(vec![Value::Null; len]),
        }
    }

    /// Create an array from existing values
    pub fn from_values(values: Vec<Value>) -> Self {
        ArrayObject {
            elements: RefCell::new(values),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get an element, `None` when out of range
    pub fn get(&self, index: usize) -> Option<Value> {
        self.elements.borrow().get(index).cloned()
    }

    /// Replace an element
    pub fn set(&self, index: usize, value: Value) -> ScriptResult<()> {
        let mut elements = self.elements.borrow_mut();
        let len = elements.len();
        match elements.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ScriptError::Range(format!(
                "Array index {} out of bounds for length {}",
                index, len
            ))),
        }
    }

    /// Snapshot of the elements
    pub fn to_vec(&self) -> Vec<Value> {
        self.elements.borrow().clone()
    }

    /// Interpret a property name as an index
    fn index(&self, name: &str) -> ScriptResult<i64> {
        name.parse::<i64>()
            .map_err(|_| no_such_property(&self.describe(), name))
    }
}

impl ScriptObject for ArrayObject {
    fn describe(&self) -> String {
        format!("Array of {} items", self.len())
    }

    fn type_of(&self) -> ScriptResult<String> {
        Ok("object".to_string())
    }

    fn get_property_type(&self, name: &str) -> ScriptResult<String> {
        if name == "length" {
            return Ok("number".to_string());
        }
        let index = self.index(name)?;
        match usize::try_from(index).ok().and_then(|i| self.get(i)) {
            Some(value) => value.type_of(),
            None => Ok("undefined".to_string()),
        }
    }

    /// Reading past either end yields null
    fn get_property(&self, name: &str) -> ScriptResult<Value> {
        if name == "length" {
            return Ok(Value::Int(self.len() as i64));
        }
        let index = self.index(name)?;
        Ok(usize::try_from(index)
            .ok()
            .and_then(|i| self.get(i))
            .unwrap_or(Value::Null))
    }

    fn set_property(&self, name: &str, value: Value) -> ScriptResult<()> {
        if name == "length" {
            return Err(ScriptError::type_error(
                "Can't set the size of an array after the fact",
            ));
        }
        let index = self.index(name)?;
        let index = usize::try_from(index).map_err(|_| {
            ScriptError::Range(format!("Array index {} out of bounds", index))
        })?;
        self.set(index, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_null_filled() {
        let array = ArrayObject::new(3);
        assert_eq!(array.len(), 3);
        assert!(matches!(array.get_property("2").unwrap(), Value::Null));
        assert!(matches!(array.get_property("length").unwrap(), Value::Int(3)));
        assert_eq!(array.describe(), "Array of 3 items");
    }

    #[test]
    fn test_out_of_range() {
        let array = ArrayObject::new(1);
        assert!(matches!(array.get_property("5").unwrap(), Value::Null));
        assert!(matches!(array.get_property("-1").unwrap(), Value::Null));
        assert!(matches!(
            array.set_property("5", Value::Bool(true)),
            Err(ScriptError::Range(_))
        ));
        assert_eq!(array.get_property_type("5").unwrap(), "undefined");
    }

    #[test]
    fn test_length_is_read_only() {
        let array = ArrayObject::new(1);
        assert!(array.set_property("length", Value::Number(4.0)).is_err());
        assert_eq!(array.get_property_type("length").unwrap(), "number");
    }

    #[test]
    fn test_non_numeric_name() {
        let array = ArrayObject::new(1);
        assert!(matches!(array.get_property("push"), Err(ScriptError::Type(_))));
    }

    #[test]
    fn test_set_and_get() {
        let array = ArrayObject::from_values(vec![Value::Null, Value::Null]);
        array
            .set_property("1", Value::String("x".into()))
            .unwrap();
        assert_eq!(array.get_property_type("1").unwrap(), "string");
    }
}
