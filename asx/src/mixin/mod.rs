//! Native extension ("mixin") interface
//!
//! A mixin module builds a list of [`Mixin`]s, each a native function with
//! a qualified `Lib.name` and declared parameter names. All modules are
//! collected into one [`MixinRegistry`] at startup.

mod scope;
pub mod stdlib;

pub use scope::{Formatted, Scope, Thrown, TypeTag, Variable, kinds};

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Modules whose name starts with this prefix are never loaded
pub const RESERVED_PREFIX: char = '_';

/// A native function body
pub type NativeFn = fn(&mut Scope) -> Result<(), Thrown>;

/// Startup errors while building the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MixinError {
    #[error("invalid mixin name `{0}`: expected `Lib.name`")]
    InvalidName(String),

    #[error("invalid parameter `{param}` for mixin `{mixin}`")]
    InvalidParameter { mixin: String, param: String },
}

/// A registered native function
#[derive(Clone)]
pub struct Mixin {
    pub name: String,
    pub params: Vec<String>,
    pub func: NativeFn,
}

impl Mixin {
    /// Build a mixin named `lib.name`, validating both parts
    pub fn new(lib: &str, name: &str, params: &[&str], func: NativeFn) -> Result<Self, MixinError> {
        let qualified = format!("{lib}.{name}");
        if !is_name_part(lib) || !is_name_part(name) {
            return Err(MixinError::InvalidName(qualified));
        }
        if let Some(param) = params.iter().find(|p| !crate::parser::is_ident(p)) {
            return Err(MixinError::InvalidParameter {
                mixin: qualified,
                param: param.to_string(),
            });
        }

        Ok(Self {
            name: qualified,
            params: params.iter().map(|p| p.to_string()).collect(),
            func,
        })
    }

    pub fn invoke(&self, scope: &mut Scope) -> Result<(), Thrown> {
        (self.func)(scope)
    }
}

impl fmt::Debug for Mixin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mixin")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// `[A-Za-z][A-Za-z0-9_]*`
fn is_name_part(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A module of native functions
pub trait MixinModule {
    /// Module name, also the `Lib` part of its mixins
    fn name(&self) -> &'static str;

    /// Build every mixin of the module
    fn build(&self) -> Result<Vec<Mixin>, MixinError>;
}

/// All registered mixins, keyed by qualified name
#[derive(Debug, Default)]
pub struct MixinRegistry {
    mixins: HashMap<String, Mixin>,
}

impl MixinRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every standard module loaded
    pub fn with_std() -> Result<Self, MixinError> {
        let mut registry = Self::new();
        registry.load(&stdlib::modules(), &[])?;
        Ok(registry)
    }

    /// Load modules, skipping reserved and disabled ones
    pub fn load(
        &mut self,
        modules: &[Box<dyn MixinModule>],
        disabled: &[String],
    ) -> Result<(), MixinError> {
        for module in modules {
            let name = module.name();
            if name.starts_with(RESERVED_PREFIX) {
                tracing::debug!(module = name, "skipping reserved mixin module");
                continue;
            }
            if disabled.iter().any(|d| d == name) {
                tracing::debug!(module = name, "mixin module disabled by configuration");
                continue;
            }

            let mixins = module.build()?;
            tracing::debug!(module = name, count = mixins.len(), "loaded mixin module");
            for mixin in mixins {
                self.register(mixin);
            }
        }
        Ok(())
    }

    /// Register one mixin; the last registration of a name wins
    pub fn register(&mut self, mixin: Mixin) {
        if let Some(previous) = self.mixins.insert(mixin.name.clone(), mixin) {
            tracing::debug!(mixin = %previous.name, "mixin replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Mixin> {
        self.mixins.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.mixins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.mixins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mixins.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.mixins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Value;

    fn answer(scope: &mut Scope) -> Result<(), Thrown> {
        scope.set("answer", Value::Num(42.0));
        Ok(())
    }

    fn other(scope: &mut Scope) -> Result<(), Thrown> {
        scope.set("answer", Value::Num(7.0));
        Ok(())
    }

    struct Demo {
        name: &'static str,
    }

    impl MixinModule for Demo {
        fn name(&self) -> &'static str {
            self.name
        }

        fn build(&self) -> Result<Vec<Mixin>, MixinError> {
            Ok(vec![Mixin::new("Demo", "answer", &[], answer)?])
        }
    }

    #[test]
    fn test_name_validation() {
        assert!(Mixin::new("Array", "len", &["buf"], answer).is_ok());
        assert!(matches!(
            Mixin::new("_Array", "len", &[], answer),
            Err(MixinError::InvalidName(_))
        ));
        assert!(matches!(
            Mixin::new("Array", "le n", &[], answer),
            Err(MixinError::InvalidName(_))
        ));
        assert!(matches!(
            Mixin::new("Array", "len", &["1buf"], answer),
            Err(MixinError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = MixinRegistry::new();
        registry.register(Mixin::new("Demo", "answer", &[], answer).unwrap());
        registry.register(Mixin::new("Demo", "answer", &[], other).unwrap());
        assert_eq!(registry.len(), 1);

        let mut scope = Scope::default();
        registry.get("Demo.answer").unwrap().invoke(&mut scope).unwrap();
        assert_eq!(scope.last_written(), Some(&Value::Num(7.0)));
    }

    #[test]
    fn test_reserved_and_disabled_modules_skipped() {
        let modules: Vec<Box<dyn MixinModule>> = vec![
            Box::new(Demo { name: "_Hidden" }),
            Box::new(Demo { name: "Demo" }),
        ];

        let mut registry = MixinRegistry::new();
        registry.load(&modules, &["Demo".to_string()]).unwrap();
        assert!(registry.is_empty());

        registry.load(&modules, &[]).unwrap();
        assert_eq!(registry.names(), vec!["Demo.answer"]);
    }

    #[test]
    fn test_std_registry() {
        let registry = MixinRegistry::with_std().unwrap();
        for name in ["Array.len", "String.upper", "File.read", "Utils.random", "Time.time"] {
            assert!(registry.contains(name), "missing {name}");
        }
    }
}
