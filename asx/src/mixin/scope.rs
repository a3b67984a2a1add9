//! Scope adapter handed to native functions

use crate::ast::Value;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// Error kinds a native may throw; any other string is passed through
pub mod kinds {
    pub const TYPE_ERROR: &str = "TypeError";
    pub const INDEX_ERROR: &str = "IndexError";
    pub const UNDEFINED_VARIABLE: &str = "UndefinedVariable";
    pub const IO_ERROR: &str = "IoError";
}

/// An error thrown by a native function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thrown {
    pub kind: String,
    pub message: String,
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// A named value a native can place into its scope
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub value: Value,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Type tag of a formatted value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Num,
    Str,
    Bool,
    Arr,
}

/// `(type_tag, raw_data)` pair exchanged with the engine.
///
/// Arrays carry a JSON array of nested pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formatted(pub TypeTag, pub JsonValue);

impl Formatted {
    /// Format a resolved value; `None` for references and equations
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Num(n) => Formatted(TypeTag::Num, JsonValue::from(*n)),
            Value::Str(s) => Formatted(TypeTag::Str, JsonValue::from(s.as_str())),
            Value::Bool(b) => Formatted(TypeTag::Bool, JsonValue::from(*b)),
            Value::Array(items) => {
                let nested = items
                    .iter()
                    .map(|item| Self::from_value(item).and_then(|f| serde_json::to_value(f).ok()))
                    .collect::<Option<Vec<_>>>()?;
                Formatted(TypeTag::Arr, JsonValue::Array(nested))
            }
            _ => return None,
        })
    }

    /// Decode back into a value; `None` when the raw data does not match its tag
    pub fn to_value(&self) -> Option<Value> {
        let Formatted(tag, data) = self;
        Some(match tag {
            TypeTag::Num => Value::Num(data.as_f64()?),
            TypeTag::Str => Value::Str(data.as_str()?.to_string()),
            TypeTag::Bool => Value::Bool(data.as_bool()?),
            TypeTag::Arr => Value::Array(
                data.as_array()?
                    .iter()
                    .map(|item| {
                        serde_json::from_value::<Formatted>(item.clone())
                            .ok()?
                            .to_value()
                    })
                    .collect::<Option<Vec<_>>>()?,
            ),
        })
    }
}

/// Bindings visible to one native invocation
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: BTreeMap<String, Value>,
    last_written: Option<String>,
}

impl Scope {
    pub fn new(bindings: BTreeMap<String, Value>) -> Self {
        Self {
            bindings,
            last_written: None,
        }
    }

    /// Value bound to `name`, or `default`
    pub fn get(&self, name: &str, default: Value) -> Value {
        self.bindings.get(name).cloned().unwrap_or(default)
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.last_written = Some(name.clone());
        self.bindings.insert(name, value);
    }

    /// Store a variable under its own name
    pub fn place(&mut self, variable: Variable) {
        self.set(variable.name, variable.value);
    }

    /// Build an error that aborts the native
    pub fn throw(&self, kind: &str, message: impl Into<String>) -> Thrown {
        Thrown {
            kind: kind.to_string(),
            message: message.into(),
        }
    }

    /// Bindings that differ from `before`, as `(type_tag, raw_data)` pairs.
    /// A changed binding with no formatted form maps to `None`.
    pub fn format_changed(
        &self,
        before: &BTreeMap<String, Value>,
    ) -> BTreeMap<String, Option<Formatted>> {
        self.bindings
            .iter()
            .filter(|(name, value)| before.get(name.as_str()) != Some(*value))
            .map(|(name, value)| (name.clone(), Formatted::from_value(value)))
            .collect()
    }

    /// The binding written most recently by `set`/`place`
    pub fn last_written(&self) -> Option<&Value> {
        self.last_written.as_deref().and_then(|n| self.bindings.get(n))
    }

    /// A parameter that must be bound
    pub fn require(&self, name: &str) -> Result<&Value, Thrown> {
        self.lookup(name)
            .ok_or_else(|| self.throw(kinds::UNDEFINED_VARIABLE, format!("'{name}' is undefined")))
    }

    pub fn num(&self, name: &str) -> Result<f64, Thrown> {
        let value = self.require(name)?;
        value.as_num().ok_or_else(|| self.type_error(name, "Num", value))
    }

    pub fn string(&self, name: &str) -> Result<&str, Thrown> {
        let value = self.require(name)?;
        value.as_str().ok_or_else(|| self.type_error(name, "String", value))
    }

    pub fn array(&self, name: &str) -> Result<&[Value], Thrown> {
        let value = self.require(name)?;
        value
            .as_array()
            .ok_or_else(|| self.type_error(name, "Array", value))
    }

    fn type_error(&self, name: &str, expected: &str, got: &Value) -> Thrown {
        self.throw(
            kinds::TYPE_ERROR,
            format!("'{name}' has to be of type {expected}, got {}", got.type_name()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope_with(pairs: &[(&str, Value)]) -> Scope {
        Scope::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_get_with_default() {
        let scope = scope_with(&[("a", Value::Num(1.0))]);
        assert_eq!(scope.get("a", Value::Bool(false)), Value::Num(1.0));
        assert_eq!(scope.get("b", Value::Bool(false)), Value::Bool(false));
    }

    #[test]
    fn test_last_written_tracks_set_and_place() {
        let mut scope = Scope::default();
        assert_eq!(scope.last_written(), None);
        scope.set("x", Value::Num(1.0));
        scope.place(Variable::new("y", Value::Str("s".to_string())));
        assert_eq!(scope.last_written(), Some(&Value::Str("s".to_string())));
    }

    #[test]
    fn test_format_tags() {
        let scope = scope_with(&[
            ("n", Value::Num(2.0)),
            ("s", Value::Str("hi".to_string())),
            ("b", Value::Bool(true)),
            ("a", Value::Array(vec![Value::Num(1.0)])),
        ]);
        let formatted: BTreeMap<_, _> = scope
            .format_changed(&BTreeMap::new())
            .into_iter()
            .map(|(k, v)| (k, v.unwrap()))
            .collect();
        assert_eq!(formatted["n"].0, TypeTag::Num);
        assert_eq!(formatted["s"].1, JsonValue::from("hi"));
        assert_eq!(formatted["b"].0, TypeTag::Bool);
        assert_eq!(
            serde_json::to_value(&formatted["a"]).unwrap(),
            serde_json::json!(["arr", [["num", 1.0]]])
        );
    }

    #[test]
    fn test_format_changed_skips_untouched_bindings() {
        let before: BTreeMap<String, Value> = [
            ("big".to_string(), Value::Num(f64::INFINITY)),
            ("buf".to_string(), Value::Array(vec![Value::Num(1.0)])),
        ]
        .into_iter()
        .collect();
        let mut scope = Scope::new(before.clone());
        scope.set("length", Value::Num(1.0));

        let changed = scope.format_changed(&before);
        assert_eq!(changed.len(), 1);
        assert_eq!(
            changed["length"],
            Some(Formatted(TypeTag::Num, JsonValue::from(1.0)))
        );
    }

    #[test]
    fn test_formatted_decodes_nested_arrays() {
        let value = Value::Array(vec![
            Value::Str("a".to_string()),
            Value::Array(vec![Value::Bool(false)]),
        ]);
        let formatted = Formatted::from_value(&value).unwrap();
        assert_eq!(formatted.to_value(), Some(value));
    }

    #[test]
    fn test_formatted_rejects_mismatched_data() {
        let bad = Formatted(TypeTag::Num, JsonValue::from("nope"));
        assert_eq!(bad.to_value(), None);
    }

    #[test]
    fn test_typed_helpers_throw() {
        let scope = scope_with(&[("s", Value::Str("x".to_string()))]);
        assert_eq!(scope.string("s").unwrap(), "x");

        let err = scope.num("s").unwrap_err();
        assert_eq!(err.kind, kinds::TYPE_ERROR);

        let err = scope.array("missing").unwrap_err();
        assert_eq!(err.kind, kinds::UNDEFINED_VARIABLE);
    }
}
