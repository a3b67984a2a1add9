//! `Array` mixins

use crate::ast::Value;
use crate::interp::Printed;
use crate::mixin::{Mixin, MixinError, MixinModule, Scope, Thrown, kinds};

pub struct ArrayModule;

impl MixinModule for ArrayModule {
    fn name(&self) -> &'static str {
        "Array"
    }

    fn build(&self) -> Result<Vec<Mixin>, MixinError> {
        Ok(vec![
            Mixin::new("Array", "len", &["buf"], len)?,
            Mixin::new("Array", "join", &["buf", "between"], join)?,
            Mixin::new("Array", "sum", &["buf"], sum)?,
            Mixin::new("Array", "contains", &["buf", "item"], contains)?,
            Mixin::new("Array", "reverse", &["buf"], reverse)?,
            Mixin::new("Array", "put", &["buf", "item"], put)?,
            Mixin::new("Array", "average", &["buf"], average)?,
            Mixin::new("Array", "find", &["buf", "item"], find)?,
            Mixin::new("Array", "sort", &["buf"], sort)?,
            Mixin::new("Array", "pop", &["buf", "index"], pop)?,
            Mixin::new("Array", "append", &["buf", "other"], append)?,
        ])
    }
}

fn len(scope: &mut Scope) -> Result<(), Thrown> {
    let length = scope.array("buf")?.len();
    scope.set("length", Value::Num(length as f64));
    Ok(())
}

/// Every element printed as `say` would, separated by `between`
fn join(scope: &mut Scope) -> Result<(), Thrown> {
    let between = scope.string("between")?;
    let joined = scope
        .array("buf")?
        .iter()
        .map(|v| Printed(v).to_string())
        .collect::<Vec<_>>()
        .join(between);
    scope.set("joined", Value::Str(joined));
    Ok(())
}

/// Numeric weight of an element: numbers as is, strings by length
fn weight(value: &Value) -> Option<f64> {
    match value {
        Value::Num(n) => Some(*n),
        Value::Str(s) => Some(s.chars().count() as f64),
        _ => None,
    }
}

/// Numbers add up, strings count their length, anything else is skipped
fn sum(scope: &mut Scope) -> Result<(), Thrown> {
    let total: f64 = scope.array("buf")?.iter().filter_map(weight).sum();
    scope.set("sum", Value::Num(total));
    Ok(())
}

/// Mean of the weighted elements
fn average(scope: &mut Scope) -> Result<(), Thrown> {
    let weights: Vec<f64> = scope.array("buf")?.iter().filter_map(weight).collect();
    if weights.is_empty() {
        return Err(scope.throw(kinds::TYPE_ERROR, "'buf' has no numbers or strings"));
    }
    let mean = weights.iter().sum::<f64>() / weights.len() as f64;
    scope.set("average", Value::Num(mean));
    Ok(())
}

fn contains(scope: &mut Scope) -> Result<(), Thrown> {
    let item = scope.require("item")?;
    let found = scope.array("buf")?.contains(item);
    scope.set("contains", Value::Bool(found));
    Ok(())
}

/// Index of the first equal element, or -1
fn find(scope: &mut Scope) -> Result<(), Thrown> {
    let item = scope.require("item")?;
    let index = scope
        .array("buf")?
        .iter()
        .position(|v| v == item)
        .map_or(-1.0, |i| i as f64);
    scope.set("index", Value::Num(index));
    Ok(())
}

/// Numbers ascending, then strings alphabetically, then everything else
/// in its original order
fn sort(scope: &mut Scope) -> Result<(), Thrown> {
    let mut nums = Vec::new();
    let mut strings = Vec::new();
    let mut other = Vec::new();
    for value in scope.array("buf")? {
        match value {
            Value::Num(n) => nums.push(*n),
            Value::Str(s) => strings.push(s.clone()),
            _ => other.push(value.clone()),
        }
    }
    nums.sort_by(f64::total_cmp);
    strings.sort();

    let sorted = nums
        .into_iter()
        .map(Value::Num)
        .chain(strings.into_iter().map(Value::Str))
        .chain(other)
        .collect();
    scope.set("buf", Value::Array(sorted));
    Ok(())
}

fn reverse(scope: &mut Scope) -> Result<(), Thrown> {
    let mut buf = scope.array("buf")?.to_vec();
    buf.reverse();
    scope.set("buf", Value::Array(buf));
    Ok(())
}

fn put(scope: &mut Scope) -> Result<(), Thrown> {
    let item = scope.require("item")?.clone();
    let mut buf = scope.array("buf")?.to_vec();
    buf.push(item);
    scope.set("buf", Value::Array(buf));
    Ok(())
}

/// Remove the element at `index`
fn pop(scope: &mut Scope) -> Result<(), Thrown> {
    let index = scope.num("index")?;
    let mut buf = scope.array("buf")?.to_vec();
    if index.fract() != 0.0 || index < 0.0 || index >= buf.len() as f64 {
        return Err(scope.throw(
            kinds::INDEX_ERROR,
            format!("index {index} out of range for length {}", buf.len()),
        ));
    }
    buf.remove(index as usize);
    scope.set("buf", Value::Array(buf));
    Ok(())
}

/// Concatenate `other` onto `buf`
fn append(scope: &mut Scope) -> Result<(), Thrown> {
    let mut buf = scope.array("buf")?.to_vec();
    buf.extend_from_slice(scope.array("other")?);
    scope.set("buf", Value::Array(buf));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn run(f: fn(&mut Scope) -> Result<(), Thrown>, pairs: &[(&str, Value)]) -> Result<Scope, Thrown> {
        let bindings: BTreeMap<String, Value> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        let mut scope = Scope::new(bindings);
        f(&mut scope)?;
        Ok(scope)
    }

    fn buf() -> Value {
        Value::Array(vec![
            Value::Num(1.0),
            Value::Str("two".to_string()),
            Value::Num(3.5),
        ])
    }

    #[test]
    fn test_len() {
        let scope = run(len, &[("buf", buf())]).unwrap();
        assert_eq!(scope.last_written(), Some(&Value::Num(3.0)));
    }

    #[test]
    fn test_len_type_error() {
        let err = run(len, &[("buf", Value::Num(1.0))]).unwrap_err();
        assert_eq!(err.kind, kinds::TYPE_ERROR);
    }

    #[test]
    fn test_join() {
        let scope = run(
            join,
            &[("buf", buf()), ("between", Value::Str("-".to_string()))],
        )
        .unwrap();
        assert_eq!(scope.lookup("joined"), Some(&Value::Str("1-two-3.5".to_string())));
    }

    #[test]
    fn test_sum_counts_string_length() {
        let scope = run(sum, &[("buf", buf())]).unwrap();
        assert_eq!(scope.last_written(), Some(&Value::Num(7.5)));
    }

    #[test]
    fn test_contains() {
        let scope = run(contains, &[("buf", buf()), ("item", Value::Num(3.5))]).unwrap();
        assert_eq!(scope.last_written(), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_average_weights_strings_by_length() {
        let scope = run(average, &[("buf", buf())]).unwrap();
        assert_eq!(scope.last_written(), Some(&Value::Num(2.5)));

        let err = run(average, &[("buf", Value::Array(vec![Value::Bool(true)]))]).unwrap_err();
        assert_eq!(err.kind, kinds::TYPE_ERROR);
    }

    #[test]
    fn test_find() {
        let scope = run(find, &[("buf", buf()), ("item", Value::Str("two".to_string()))]).unwrap();
        assert_eq!(scope.last_written(), Some(&Value::Num(1.0)));

        let scope = run(find, &[("buf", buf()), ("item", Value::Num(9.0))]).unwrap();
        assert_eq!(scope.last_written(), Some(&Value::Num(-1.0)));
    }

    #[test]
    fn test_sort_groups_numbers_before_strings() {
        let mixed = Value::Array(vec![
            Value::Str("pear".to_string()),
            Value::Bool(false),
            Value::Num(3.0),
            Value::Str("apple".to_string()),
            Value::Num(-1.0),
        ]);
        let scope = run(sort, &[("buf", mixed)]).unwrap();
        assert_eq!(
            scope.array("buf").unwrap(),
            [
                Value::Num(-1.0),
                Value::Num(3.0),
                Value::Str("apple".to_string()),
                Value::Str("pear".to_string()),
                Value::Bool(false),
            ]
        );
    }

    #[test]
    fn test_pop() {
        let scope = run(pop, &[("buf", buf()), ("index", Value::Num(1.0))]).unwrap();
        assert_eq!(
            scope.array("buf").unwrap(),
            [Value::Num(1.0), Value::Num(3.5)]
        );

        for bad in [3.0, -1.0, 0.5] {
            let err = run(pop, &[("buf", buf()), ("index", Value::Num(bad))]).unwrap_err();
            assert_eq!(err.kind, kinds::INDEX_ERROR);
        }
        let err = run(pop, &[("buf", buf()), ("index", Value::Str("0".to_string()))]).unwrap_err();
        assert_eq!(err.kind, kinds::TYPE_ERROR);
    }

    #[test]
    fn test_append_concatenates() {
        let other = Value::Array(vec![Value::Bool(true)]);
        let scope = run(append, &[("buf", buf()), ("other", other)]).unwrap();
        assert_eq!(scope.array("buf").unwrap().len(), 4);

        let err = run(append, &[("buf", buf()), ("other", Value::Num(1.0))]).unwrap_err();
        assert_eq!(err.kind, kinds::TYPE_ERROR);
    }

    #[test]
    fn test_reverse_and_put_rewrite_buf() {
        let scope = run(reverse, &[("buf", buf())]).unwrap();
        let Some(Value::Array(items)) = scope.lookup("buf") else {
            panic!("Expected array");
        };
        assert_eq!(items[0], Value::Num(3.5));

        let scope = run(put, &[("buf", buf()), ("item", Value::Bool(true))]).unwrap();
        assert_eq!(scope.array("buf").unwrap().len(), 4);
    }
}
