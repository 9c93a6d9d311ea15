//! Slots, scopes and the outer environment.
//!
//! A block frame holds one [`Slot`] per binding, created empty before any
//! binding is evaluated and written exactly once. Closures keep an `Rc` to
//! the frame they were created in, so they observe slots filled after
//! their creation. Call frames reuse the same type with every slot filled
//! at creation.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::types::{EvalError, Value};

/// Storage cell of one binding.
#[derive(Debug, Clone)]
pub enum Slot {
    Uninitialized,
    Filled(Value),
}

/// The outer (global) name -> value environment.
///
/// Clones share the same map; procedures resolve outer names through it at
/// call time.
#[derive(Clone, Default)]
pub struct Environment {
    vars: Rc<RefCell<BTreeMap<String, Value>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.vars.borrow().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.borrow().contains_key(name)
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.vars.borrow_mut().insert(name.into(), value);
    }

    /// Overwrites every given name in one step.
    pub fn merge(&self, entries: Vec<(String, Value)>) {
        let mut vars = self.vars.borrow_mut();
        for (name, value) in entries {
            vars.insert(name, value);
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.vars.borrow().keys().cloned().collect()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.names())
            .finish()
    }
}

/// One level of the lexical scope chain.
pub struct Scope {
    slots: HashMap<String, RefCell<Slot>>,
    parent: Option<Rc<Scope>>,
    globals: Environment,
}

impl Scope {
    /// Declare phase: a frame with an empty slot for every name.
    pub fn declare<'n>(
        names: impl IntoIterator<Item = &'n str>,
        parent: Option<Rc<Scope>>,
        globals: &Environment,
    ) -> Rc<Scope> {
        Rc::new(Scope {
            slots: names
                .into_iter()
                .map(|n| (n.to_owned(), RefCell::new(Slot::Uninitialized)))
                .collect(),
            parent,
            globals: globals.clone(),
        })
    }

    /// A call frame binding `params` to `args` under `parent`.
    pub fn bind(params: &[String], args: Vec<Value>, parent: &Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            slots: params
                .iter()
                .cloned()
                .zip(args)
                .map(|(p, v)| (p, RefCell::new(Slot::Filled(v))))
                .collect(),
            parent: Some(Rc::clone(parent)),
            globals: parent.globals.clone(),
        })
    }

    /// Resolve `name` through the scope chain, then the outer environment.
    pub fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        let mut scope = self;
        loop {
            if let Some(slot) = scope.slots.get(name) {
                return match &*slot.borrow() {
                    Slot::Filled(v) => Ok(v.clone()),
                    Slot::Uninitialized => Err(EvalError::UninitializedBinding {
                        name: name.to_owned(),
                    }),
                };
            }
            match &scope.parent {
                Some(p) => scope = p,
                None => break,
            }
        }
        self.globals
            .get(name)
            .ok_or_else(|| EvalError::UnboundName {
                name: name.to_owned(),
            })
    }

    /// Fill phase write. Each slot of a frame is written once.
    pub fn fill(&self, name: &str, value: Value) {
        match self.slots.get(name) {
            Some(slot) => {
                let previous = slot.replace(Slot::Filled(value));
                debug_assert!(
                    matches!(previous, Slot::Uninitialized),
                    "slot '{}' filled twice",
                    name
                );
            }
            None => debug_assert!(false, "no slot declared for '{}'", name),
        }
    }

    /// Value of a slot declared in this frame, if it has been filled.
    pub fn filled(&self, name: &str) -> Option<Value> {
        match &*self.slots.get(name)?.borrow() {
            Slot::Filled(v) => Some(v.clone()),
            Slot::Uninitialized => None,
        }
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }
}

impl fmt::Debug for Scope {
    // Frames and closures reference each other; print names only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.slots.keys().collect();
        names.sort();
        f.debug_struct("Scope")
            .field("slots", &names)
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_reads_as_uninitialized() {
        let env = Environment::new();
        let frame = Scope::declare(["a"], None, &env);
        assert_eq!(
            frame.lookup("a"),
            Err(EvalError::UninitializedBinding { name: "a".into() })
        );
        frame.fill("a", Value::Int(1));
        assert_eq!(frame.lookup("a"), Ok(Value::Int(1)));
    }

    #[test]
    fn frame_shadows_globals_and_falls_back_to_them() {
        let env = Environment::new();
        env.set("a", Value::Int(1));
        env.set("b", Value::Int(2));
        let frame = Scope::declare(["a"], None, &env);
        frame.fill("a", Value::Int(10));
        assert_eq!(frame.lookup("a"), Ok(Value::Int(10)));
        assert_eq!(frame.lookup("b"), Ok(Value::Int(2)));
        assert!(matches!(
            frame.lookup("c"),
            Err(EvalError::UnboundName { .. })
        ));
    }

    #[test]
    fn call_frame_sees_enclosing_frame() {
        let env = Environment::new();
        let frame = Scope::declare(["k"], None, &env);
        let call = Scope::bind(&["x".to_owned()], vec![Value::Int(3)], &frame);
        // filled after the call frame exists
        frame.fill("k", Value::Int(4));
        assert_eq!(call.lookup("x"), Ok(Value::Int(3)));
        assert_eq!(call.lookup("k"), Ok(Value::Int(4)));
    }

    #[test]
    fn globals_are_shared_between_clones() {
        let env = Environment::new();
        let other = env.clone();
        other.set("x", Value::Int(5));
        assert_eq!(env.get("x"), Some(Value::Int(5)));
    }
}
