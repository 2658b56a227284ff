use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::value::Value;

pub type EnvironmentRef = Rc<RefCell<Environment>>;

/// One lexical scope frame. Frames are shared: a function value keeps the
/// frame it was defined in alive, and every call gets a fresh child of it.
#[derive(Debug, Default)]
pub struct Environment {
    parent: Option<EnvironmentRef>,
    bindings: IndexMap<String, Value>,
}

impl Environment {
    pub fn new_root() -> EnvironmentRef {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn new_child(parent: &EnvironmentRef) -> EnvironmentRef {
        Rc::new(RefCell::new(Self {
            parent: Some(Rc::clone(parent)),
            bindings: IndexMap::new(),
        }))
    }

    /// Writes into this frame only; an outer binding of the same name is
    /// shadowed, never updated.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn lookup(env: &EnvironmentRef, name: &str) -> Option<Value> {
        let frame = env.borrow();
        if let Some(value) = frame.bindings.get(name) {
            return Some(value.clone());
        }
        match &frame.parent {
            Some(parent) => Environment::lookup(parent, name),
            None => None,
        }
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
