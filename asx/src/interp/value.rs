//! Runtime behavior of values

use crate::ast::Value;
use std::fmt;

impl Value {
    /// Check if value is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Num(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => false,
        }
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "num",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::Array(_) => "arr",
            Value::Var(_) => "variable",
            Value::Element { .. } => "element",
            Value::Call { .. } => "call",
            Value::Arithmetic(_) => "equation",
        }
    }

    /// Whether the value may be stored in memory as is
    pub fn is_resolved(&self) -> bool {
        match self {
            Value::Num(_) | Value::Str(_) | Value::Bool(_) => true,
            Value::Array(items) => items.iter().all(Value::is_resolved),
            _ => false,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// How `say` prints a value: strings bare, everything else in source form
pub struct Printed<'a>(pub &'a Value);

impl fmt::Display for Printed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Str(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}
