//! Lexical scopes
//!
//! A scope is a shared, mutable name table with a link to its parent. Blocks
//! and loops get a child scope; function calls get a child of the scope the
//! function was defined in, which is how closures see later mutations of
//! outer variables.
//!
//! A function stored in the scope it closes over is a reference cycle.
//! Every scope a function is defined in is therefore recorded in a table
//! shared by the whole tree, and [`Scope::release`] on the root clears all
//! of them.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{ScriptError, ScriptResult};
use crate::value::Value;

use super::object::ScriptObject;
use super::reference::Reference;

/// Default limit on nested function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Call nesting, inherited by block scopes and bumped by calls
#[derive(Debug, Clone, Copy)]
struct CallFrame {
    depth: usize,
    max_depth: usize,
}

/// Scopes captured by function definitions, shared by a scope tree
type Captured = Rc<RefCell<Vec<Weak<ScopeData>>>>;

struct ScopeData {
    vars: RefCell<FxHashMap<String, Value>>,
    parent: Option<Scope>,
    frame: CallFrame,
    captured: Captured,
    is_captured: Cell<bool>,
}

/// Handle to a scope; clones share the same table
#[derive(Clone)]
pub struct Scope(Rc<ScopeData>);

impl Scope {
    /// Create a root scope with the default call depth limit
    pub fn new() -> Self {
        Self::with_max_call_depth(DEFAULT_MAX_CALL_DEPTH)
    }

    /// Create a root scope
    pub fn with_max_call_depth(max_depth: usize) -> Self {
        Scope(Rc::new(ScopeData {
            vars: RefCell::new(FxHashMap::default()),
            parent: None,
            frame: CallFrame {
                depth: 0,
                max_depth,
            },
            captured: Captured::default(),
            is_captured: Cell::new(false),
        }))
    }

    fn with_parent(parent: &Scope, frame: CallFrame) -> Self {
        Scope(Rc::new(ScopeData {
            vars: RefCell::new(FxHashMap::default()),
            parent: Some(parent.clone()),
            frame,
            captured: parent.0.captured.clone(),
            is_captured: Cell::new(false),
        }))
    }

    /// Create a nested block scope
    pub fn child(&self) -> Scope {
        Self::with_parent(self, self.0.frame)
    }

    /// Create the scope for a call to a function defined in `self`
    ///
    /// Depth is counted along the caller's chain, not the definition's.
    pub fn call_scope(&self, caller: &Scope) -> ScriptResult<Scope> {
        let frame = caller.0.frame;
        if frame.depth >= frame.max_depth {
            return Err(ScriptError::CallDepth {
                limit: frame.max_depth,
            });
        }
        Ok(Self::with_parent(
            self,
            CallFrame {
                depth: frame.depth + 1,
                max_depth: frame.max_depth,
            },
        ))
    }

    /// Parent scope, if any
    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    /// Current call nesting depth
    pub fn call_depth(&self) -> usize {
        self.0.frame.depth
    }

    /// Check whether two handles point at the same scope
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Define a new name in this scope
    ///
    /// Redefining a name already defined in this same scope is an error;
    /// shadowing a name from an enclosing scope is fine.
    pub fn define(&self, name: &str, value: Value) -> ScriptResult<()> {
        let mut vars = self.0.vars.borrow_mut();
        if vars.contains_key(name) {
            return Err(ScriptError::reference(format!(
                "Duplicate definition for '{}'",
                name
            )));
        }
        vars.insert(name.to_string(), value);
        Ok(())
    }

    /// Define a name in this scope, replacing any existing binding
    pub(crate) fn bind(&self, name: &str, value: Value) {
        self.0.vars.borrow_mut().insert(name.to_string(), value);
    }

    /// Check whether a name is defined in this scope itself
    pub fn contains_own(&self, name: &str) -> bool {
        self.0.vars.borrow().contains_key(name)
    }

    /// Look a name up in this scope only
    pub fn get_own(&self, name: &str) -> Option<Value> {
        self.0.vars.borrow().get(name).cloned()
    }

    /// Find the nearest scope defining `name`
    fn owner(&self, name: &str) -> Option<&Scope> {
        let mut scope = self;
        loop {
            if scope.contains_own(name) {
                return Some(scope);
            }
            scope = scope.parent()?;
        }
    }

    /// Read a name, searching enclosing scopes
    pub fn get(&self, name: &str) -> ScriptResult<Value> {
        self.owner(name)
            .and_then(|scope| scope.get_own(name))
            .ok_or_else(|| no_such_symbol(name))
    }

    /// Overwrite an existing name in the nearest scope defining it
    pub fn set(&self, name: &str, value: Value) -> ScriptResult<()> {
        let owner = self.owner(name).ok_or_else(|| no_such_symbol(name))?;
        owner.0.vars.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }

    /// Resolve a name to a reference anchored at the scope that owns it
    pub fn find_symbol(&self, name: &str) -> ScriptResult<Reference> {
        let owner = self.owner(name).ok_or_else(|| no_such_symbol(name))?;
        Ok(Reference::Scope {
            scope: owner.clone(),
            name: name.to_string(),
        })
    }

    /// Names defined in this scope itself
    pub fn names(&self) -> Vec<String> {
        self.0.vars.borrow().keys().cloned().collect()
    }

    /// Drop every binding in this scope
    pub fn clear(&self) {
        // Take the table first so value drops cannot observe a live borrow
        let vars = std::mem::take(&mut *self.0.vars.borrow_mut());
        drop(vars);
    }

    /// Record that a function closing over this scope was created
    pub(crate) fn capture(&self) {
        if self.0.is_captured.replace(true) {
            return;
        }
        let mut captured = self.0.captured.borrow_mut();
        if captured.len() == captured.capacity() {
            captured.retain(|scope| scope.strong_count() > 0);
        }
        captured.push(Rc::downgrade(&self.0));
    }

    /// Clear this scope and every captured scope still alive in its tree
    ///
    /// Breaks the cycles between functions and the scopes they close over.
    /// The scopes stay usable, but empty.
    pub fn release(&self) {
        self.clear();
        let captured = std::mem::take(&mut *self.0.captured.borrow_mut());
        let count = captured.len();
        for scope in captured.iter().filter_map(Weak::upgrade) {
            scope.is_captured.set(false);
            Scope(scope).clear();
        }
        debug!(captured = count, "released scopes");
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("names", &self.names())
            .field("depth", &self.0.frame.depth)
            .finish()
    }
}

pub(crate) fn no_such_symbol(name: &str) -> ScriptError {
    ScriptError::reference(format!("No such variable or method: {}", name))
}

/// Scopes are objects whose properties are their variables
impl ScriptObject for Scope {
    fn describe(&self) -> String {
        "Scope".to_string()
    }

    fn type_of(&self) -> ScriptResult<String> {
        Ok("object".to_string())
    }

    fn get_property_type(&self, name: &str) -> ScriptResult<String> {
        match self.get(name) {
            Ok(value) => value.type_of(),
            Err(_) => Ok("undefined".to_string()),
        }
    }

    fn get_property(&self, name: &str) -> ScriptResult<Value> {
        self.get(name)
    }

    fn set_property(&self, name: &str, value: Value) -> ScriptResult<()> {
        self.set(name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_lookup_through_parents() {
        let root = Scope::new();
        root.define("x", Value::Number(1.0)).unwrap();
        let inner = root.child().child();
        assert_eq!(inner.get("x").unwrap().as_number(), Some(1.0));

        inner.set("x", Value::Number(2.0)).unwrap();
        assert_eq!(root.get("x").unwrap().as_number(), Some(2.0));
        assert!(!inner.contains_own("x"));
    }

    #[test]
    fn test_duplicate_definition() {
        let scope = Scope::new();
        scope.define("a", Value::Null).unwrap();
        let err = scope.define("a", Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "ReferenceError: Duplicate definition for 'a'");

        // Shadowing in a child is allowed
        scope.child().define("a", Value::Null).unwrap();
    }

    #[test]
    fn test_bind_replaces() {
        let scope = Scope::new();
        scope.bind("a", Value::Null);
        scope.bind("a", Value::Bool(true));
        assert_eq!(scope.get("a").unwrap().as_bool(), Some(true));
        assert_eq!(scope.names(), ["a"]);
    }

    #[test]
    fn test_set_undefined_name_fails() {
        let scope = Scope::new();
        assert!(matches!(
            scope.set("missing", Value::Null),
            Err(ScriptError::Reference(_))
        ));
        assert!(scope.get("missing").is_err());
    }

    #[test]
    fn test_find_symbol_anchors_at_owner() {
        let root = Scope::new();
        root.define("v", Value::Bool(true)).unwrap();
        let child = root.child();
        match child.find_symbol("v").unwrap() {
            Reference::Scope { scope, .. } => assert!(scope.ptr_eq(&root)),
            Reference::Member { .. } => panic!("expected a scope reference"),
        }
    }

    #[test]
    fn test_call_depth_limit() {
        let root = Scope::with_max_call_depth(2);
        let first = root.call_scope(&root).unwrap();
        let second = root.call_scope(&first).unwrap();
        assert_eq!(second.call_depth(), 2);
        assert!(matches!(
            root.call_scope(&second),
            Err(ScriptError::CallDepth { limit: 2 })
        ));
        // Block scopes keep the frame
        assert_eq!(second.child().call_depth(), 2);
    }

    #[test]
    fn test_clear() {
        let scope = Scope::new();
        scope.define("a", Value::Null).unwrap();
        scope.clear();
        assert!(scope.names().is_empty());
    }

    #[test]
    fn test_dangling_reference() {
        let scope = Scope::new();
        scope.define("gone", Value::Bool(true)).unwrap();
        let reference = scope.find_symbol("gone").unwrap();
        scope.clear();
        let err = reference.dereference().unwrap_err();
        assert_eq!(err.to_string(), "ReferenceError: Variable 'gone' is no longer defined");
    }

    #[test]
    fn test_release_clears_captured_scopes() {
        let root = Scope::new();
        let block = root.child();
        let frame = block.call_scope(&block).unwrap();
        block.define("a", Value::Null).unwrap();
        frame.define("b", Value::Null).unwrap();
        block.capture();
        block.capture();
        frame.capture();

        root.release();
        assert!(block.names().is_empty());
        assert!(frame.names().is_empty());
    }

    #[test]
    fn test_release_skips_freed_scopes() {
        let root = Scope::new();
        root.child().capture();
        let kept = root.child();
        kept.define("x", Value::Null).unwrap();
        kept.capture();
        root.release();
        assert!(kept.names().is_empty());
    }
}
