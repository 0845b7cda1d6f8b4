//! Classes and instances
//!
//! A class is an ordered list of member templates. Constructing it copies
//! every template into a fresh instance and then runs the constructor.
//! Methods stay unbound inside the instance and are bound to it each time
//! they are read, so an instance never refers to itself. Constructors are stored under
//! `<ClassName>:<arity>`, where arity counts the implicit `this`, so a class
//! can have one per argument count.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{ScriptError, ScriptResult};
use crate::value::Value;

use super::function::{BoundMethod, Function};
use super::object::{ScriptObject, no_such_property};
use super::scope::Scope;

/// Key of the constructor taking `arity` parameters (including `this`)
pub fn method_key(name: &str, arity: usize) -> String {
    format!("{}:{}", name, arity)
}

/// Script class
#[derive(Debug)]
pub struct Class {
    name: String,
    members: Vec<(String, Value)>,
}

impl Class {
    /// Create a class from member templates in declaration order
    pub fn new(name: impl Into<String>, members: Vec<(String, Value)>) -> Self {
        Class {
            name: name.into(),
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member(&self, key: &str) -> Option<&Value> {
        self.members
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

impl ScriptObject for Class {
    fn describe(&self) -> String {
        format!("Class '{}'", self.name)
    }

    fn type_of(&self) -> ScriptResult<String> {
        Ok("function".to_string())
    }

    fn construct(&self, args: &[Value], scope: &Scope) -> ScriptResult<Value> {
        let arity = args.len() + 1;
        let key = method_key(&self.name, arity);
        let constructor = self.member(&key).cloned().ok_or_else(|| {
            ScriptError::type_error(format!(
                "Constructor with {} arguments not found for {}",
                args.len(),
                self.name
            ))
        })?;

        debug!(class = %self.name, arity, "construct");

        let instance = Rc::new(Instance::new(&self.name));
        for (name, template) in &self.members {
            instance.insert(name, template.clone());
        }

        let mut full_args = Vec::with_capacity(arity);
        full_args.push(Value::Instance(instance.clone()));
        full_args.extend_from_slice(args);
        constructor.call(&full_args, scope)?;

        Ok(Value::Instance(instance))
    }
}

/// Tie a method template to the instance it was read from
fn bind(template: Value, instance: &Rc<Instance>) -> Value {
    match &template {
        Value::Function(function) => match function.as_ref() {
            Function::Script(method) if method.is_method() => Value::Function(Rc::new(
                Function::Bound(BoundMethod::new(method.clone(), instance.clone())),
            )),
            _ => template,
        },
        _ => template,
    }
}

/// Instance of a [`Class`]
#[derive(Debug)]
pub struct Instance {
    class_name: String,
    members: RefCell<FxHashMap<String, Value>>,
}

impl Instance {
    fn new(class_name: &str) -> Self {
        Instance {
            class_name: class_name.to_string(),
            members: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    fn insert(&self, name: &str, value: Value) {
        self.members.borrow_mut().insert(name.to_string(), value);
    }

    /// Read a member, binding methods to this instance
    pub fn bound_member(self: &Rc<Self>, name: &str) -> ScriptResult<Value> {
        Ok(bind(self.get_property(name)?, self))
    }
}

impl ScriptObject for Instance {
    fn describe(&self) -> String {
        format!("Instance of class '{}'", self.class_name)
    }

    fn type_of(&self) -> ScriptResult<String> {
        Ok("object".to_string())
    }

    fn get_property_type(&self, name: &str) -> ScriptResult<String> {
        match self.members.borrow().get(name) {
            Some(value) => value.type_of(),
            None => Ok("undefined".to_string()),
        }
    }

    /// Methods come back unbound; see [`Instance::bound_member`]
    fn get_property(&self, name: &str) -> ScriptResult<Value> {
        self.members
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| no_such_property(&self.describe(), name))
    }

    /// Assigning an unknown member adds it
    fn set_property(&self, name: &str, value: Value) -> ScriptResult<()> {
        self.insert(name, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::function::{NativeFunction, ScriptFunction};

    fn point_class(scope: &Scope) -> Class {
        let ctor = ScriptFunction::new(
            "Point",
            vec!["this".into(), "x".into()],
            "{ this.x = x; }",
            scope.clone(),
            true,
        );
        let get_x = ScriptFunction::new(
            "getX",
            vec!["this".into()],
            "{ return this.x; }",
            scope.clone(),
            true,
        );
        Class::new(
            "Point",
            vec![
                ("x".into(), Value::Number(0.0)),
                (method_key("Point", 2), Value::Function(Rc::new(Function::Script(ctor)))),
                ("getX".into(), Value::Function(Rc::new(Function::Script(get_x)))),
            ],
        )
    }

    #[test]
    fn test_construct_runs_constructor() {
        let scope = Scope::new();
        let class = point_class(&scope);
        let point = class.construct(&[Value::Number(7.0)], &scope).unwrap();
        assert_eq!(point.get_property("x").unwrap().as_number(), Some(7.0));

        let get_x = point.get_property("getX").unwrap();
        let x = get_x.call(&[], &scope).unwrap();
        assert_eq!(x.as_number(), Some(7.0));
    }

    #[test]
    fn test_method_keeps_instance_alive() {
        let scope = Scope::new();
        let class = point_class(&scope);
        let get_x = {
            let point = class.construct(&[Value::Int(3)], &scope).unwrap();
            let Value::Instance(instance) = &point else {
                panic!("expected an instance, got {:?}", point);
            };
            assert_eq!(instance.class_name(), "Point");
            point.get_property("getX").unwrap()
        };
        assert_eq!(get_x.call(&[], &scope).unwrap().as_number(), Some(3.0));
    }

    #[test]
    fn test_instance_does_not_hold_itself() {
        let scope = Scope::new();
        let class = point_class(&scope);
        let point = class.construct(&[Value::Int(1)], &scope).unwrap();
        let Value::Instance(instance) = &point else {
            panic!("expected an instance, got {:?}", point);
        };
        let method = point.get_property("getX").unwrap();
        assert_eq!(Rc::strong_count(instance), 2);
        drop(method);
        assert_eq!(Rc::strong_count(instance), 1);
    }

    #[test]
    fn test_missing_constructor() {
        let scope = Scope::new();
        let class = point_class(&scope);
        let err = class.construct(&[], &scope).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: Constructor with 0 arguments not found for Point"
        );
    }

    #[test]
    fn test_native_constructor() {
        let ctor = NativeFunction::new("Option", |args, _| {
            args[0].set_property("text", args[1].clone())?;
            Ok(Value::Null)
        });
        let class = Class::new("Option", vec![(method_key("Option", 2), ctor.into_value())]);
        let scope = Scope::new();
        let option = class.construct(&[Value::String("a".into())], &scope).unwrap();
        assert_eq!(option.get_property_type("text").unwrap(), "string");
        assert_eq!(option.get_property_type("value").unwrap(), "undefined");
        assert_eq!(option.describe(), "Instance of class 'Option'");
    }
}
