//! Three-tier memory: globals, the function registry and persistent
//! per-function locals
//!
//! A function's local scope is created on its first call and survives
//! between calls, so state from an earlier call stays visible until it is
//! overwritten.

use crate::ast::{Block, Value};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// A registered user function
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: Block,
}

/// Memory owned by one interpreter for one run
#[derive(Debug, Default)]
pub struct Memory {
    globals: HashMap<String, Value>,
    functions: HashMap<String, Rc<Function>>,
    locals: HashMap<String, HashMap<String, Value>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable: locals of `frame`, then globals
    pub fn lookup(&self, frame: Option<&str>, name: &str) -> Option<&Value> {
        frame
            .and_then(|f| self.locals.get(f))
            .and_then(|scope| scope.get(name))
            .or_else(|| self.globals.get(name))
    }

    /// Store into the active tier
    pub fn assign(&mut self, frame: Option<&str>, name: impl Into<String>, value: Value) {
        debug_assert!(value.is_resolved());
        match frame {
            Some(f) => {
                self.locals
                    .entry(f.to_string())
                    .or_default()
                    .insert(name.into(), value);
            }
            None => {
                self.globals.insert(name.into(), value);
            }
        }
    }

    /// Remove a binding from the active tier only
    pub fn remove(&mut self, frame: Option<&str>, name: &str) -> Option<Value> {
        match frame {
            Some(f) => self.locals.get_mut(f)?.remove(name),
            None => self.globals.remove(name),
        }
    }

    /// Register a function; returns true if it replaced an earlier one
    pub fn define_function(&mut self, name: &str, function: Function) -> bool {
        self.functions
            .insert(name.to_string(), Rc::new(function))
            .is_some()
    }

    pub fn function(&self, name: &str) -> Option<Rc<Function>> {
        self.functions.get(name).cloned()
    }

    /// Zip arguments with parameters into the function's persistent locals.
    /// Extra arguments are dropped and missing parameters stay unbound.
    pub fn bind_arguments(&mut self, name: &str, parameters: &[String], args: Vec<Value>) {
        let scope = self.locals.entry(name.to_string()).or_default();
        for (param, arg) in parameters.iter().zip(args) {
            scope.insert(param.clone(), arg);
        }
    }

    /// Every binding visible from `frame`, locals shadowing globals
    pub fn visible(&self, frame: Option<&str>) -> BTreeMap<String, Value> {
        let mut view: BTreeMap<String, Value> = self
            .globals
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(scope) = frame.and_then(|f| self.locals.get(f)) {
            view.extend(scope.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        view
    }

    pub fn globals(&self) -> &HashMap<String, Value> {
        &self.globals
    }

    pub fn locals(&self, function: &str) -> Option<&HashMap<String, Value>> {
        self.locals.get(function)
    }
}
