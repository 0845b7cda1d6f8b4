//! Runtime support
//!
//! This module contains the object kinds behind non-primitive values:
//! - The object protocol shared by every kind ([`ScriptObject`])
//! - Scopes and the references that point into them or into objects
//! - Arrays, string methods and regular expressions
//! - Functions (script, native and bound) and classes

pub mod array;
pub mod class;
pub mod function;
pub mod object;
pub mod reference;
pub mod regexp;
pub mod scope;
pub mod string;

pub use array::ArrayObject;
pub use class::{Class, Instance, method_key};
pub use function::{BoundMethod, Function, NativeFn, NativeFunction, ScriptFunction};
pub use object::ScriptObject;
pub use reference::{Operand, Reference};
pub use regexp::RegExpObject;
pub use scope::{DEFAULT_MAX_CALL_DEPTH, Scope};
