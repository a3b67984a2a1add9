//! `Utils` mixins

use crate::ast::Value;
use crate::mixin::{Mixin, MixinError, MixinModule, Scope, Thrown, kinds};
use rand::Rng;
use uuid::Uuid;

pub struct UtilsModule;

impl MixinModule for UtilsModule {
    fn name(&self) -> &'static str {
        "Utils"
    }

    fn build(&self) -> Result<Vec<Mixin>, MixinError> {
        Ok(vec![
            Mixin::new("Utils", "random", &["__a", "__b"], random)?,
            Mixin::new("Utils", "uuid", &[], new_uuid)?,
        ])
    }
}

/// Random integer in `__a..=__b`
fn random(scope: &mut Scope) -> Result<(), Thrown> {
    let low = scope.num("__a")?.ceil();
    let high = scope.num("__b")?.floor();
    if !low.is_finite() || !high.is_finite() || low > high {
        return Err(scope.throw(
            kinds::TYPE_ERROR,
            format!("empty range {low}..{high}"),
        ));
    }

    let n = rand::thread_rng().gen_range(low as i64..=high as i64);
    scope.set("random", Value::Num(n as f64));
    Ok(())
}

/// Random version 4 UUID in hyphenated form
fn new_uuid(scope: &mut Scope) -> Result<(), Thrown> {
    scope.set("uuid", Value::Str(Uuid::new_v4().to_string()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn scope(a: f64, b: f64) -> Scope {
        let bindings: BTreeMap<String, Value> = [
            ("__a".to_string(), Value::Num(a)),
            ("__b".to_string(), Value::Num(b)),
        ]
        .into_iter()
        .collect();
        Scope::new(bindings)
    }

    #[test]
    fn test_random_is_inclusive_integer() {
        for _ in 0..50 {
            let mut s = scope(1.0, 3.0);
            random(&mut s).unwrap();
            let Some(Value::Num(n)) = s.last_written() else {
                panic!("Expected number");
            };
            assert!((1.0..=3.0).contains(n));
            assert_eq!(n.fract(), 0.0);
        }
    }

    #[test]
    fn test_random_single_value() {
        let mut s = scope(5.0, 5.0);
        random(&mut s).unwrap();
        assert_eq!(s.last_written(), Some(&Value::Num(5.0)));
    }

    #[test]
    fn test_uuid_is_fresh_v4() {
        let mut s = Scope::default();
        new_uuid(&mut s).unwrap();
        let Some(Value::Str(first)) = s.last_written().cloned() else {
            panic!("Expected string");
        };
        assert_eq!(first.len(), 36);
        assert_eq!(Uuid::parse_str(&first).unwrap().get_version_num(), 4);

        new_uuid(&mut s).unwrap();
        assert_ne!(s.last_written(), Some(&Value::Str(first)));
    }

    #[test]
    fn test_random_empty_range() {
        let mut s = scope(4.0, 2.0);
        assert_eq!(random(&mut s).unwrap_err().kind, kinds::TYPE_ERROR);
    }
}
