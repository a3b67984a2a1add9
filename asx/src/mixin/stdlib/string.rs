//! `String` mixins
//!
//! Indices count characters, not bytes.

use crate::ast::Value;
use crate::mixin::{Mixin, MixinError, MixinModule, Scope, Thrown, Variable, kinds};
use regex::{Match, Regex};

pub struct StringModule;

impl MixinModule for StringModule {
    fn name(&self) -> &'static str {
        "String"
    }

    fn build(&self) -> Result<Vec<Mixin>, MixinError> {
        Ok(vec![
            Mixin::new("String", "length", &["string"], length)?,
            Mixin::new("String", "upper", &["string"], upper)?,
            Mixin::new("String", "lower", &["string"], lower)?,
            Mixin::new("String", "strip", &["string"], strip)?,
            Mixin::new("String", "substr", &["string", "__a", "__b"], substr)?,
            Mixin::new("String", "split", &["string", "sub"], split)?,
            Mixin::new("String", "find", &["string", "sub"], find)?,
            Mixin::new("String", "replace", &["string", "__a", "__b"], replace)?,
            Mixin::new("String", "to_num", &["string"], to_num)?,
            Mixin::new("String", "regex", &["string", "re"], regex_matches)?,
            Mixin::new("String", "to_bool", &["value"], to_bool)?,
            Mixin::new("String", "is_num", &["string"], is_num)?,
            Mixin::new("String", "is_lower", &["string"], is_lower)?,
            Mixin::new("String", "is_upper", &["string"], is_upper)?,
        ])
    }
}

fn place_string(scope: &mut Scope, s: String) {
    scope.place(Variable::new("string", Value::Str(s)));
}

fn length(scope: &mut Scope) -> Result<(), Thrown> {
    let n = scope.string("string")?.chars().count();
    scope.set("length", Value::Num(n as f64));
    Ok(())
}

fn upper(scope: &mut Scope) -> Result<(), Thrown> {
    let s = scope.string("string")?.to_uppercase();
    place_string(scope, s);
    Ok(())
}

fn lower(scope: &mut Scope) -> Result<(), Thrown> {
    let s = scope.string("string")?.to_lowercase();
    place_string(scope, s);
    Ok(())
}

fn strip(scope: &mut Scope) -> Result<(), Thrown> {
    let s = scope.string("string")?.trim().to_string();
    place_string(scope, s);
    Ok(())
}

/// Characters `__a..__b` of `string`
fn substr(scope: &mut Scope) -> Result<(), Thrown> {
    let a = scope.num("__a")?;
    let b = scope.num("__b")?;
    let s = scope.string("string")?;
    let len = s.chars().count();

    if a < 0.0 || b < a || b > len as f64 {
        return Err(scope.throw(
            kinds::INDEX_ERROR,
            format!("substring {a}..{b} out of range for length {len}"),
        ));
    }

    let (a, b) = (a as usize, b as usize);
    let sub: String = s.chars().skip(a).take(b - a).collect();
    place_string(scope, sub);
    Ok(())
}

fn split(scope: &mut Scope) -> Result<(), Thrown> {
    let sub = scope.string("sub")?;
    if sub.is_empty() {
        return Err(scope.throw(kinds::TYPE_ERROR, "'sub' must not be empty"));
    }
    let parts = scope
        .string("string")?
        .split(sub)
        .map(|p| Value::Str(p.to_string()))
        .collect();
    scope.set("parts", Value::Array(parts));
    Ok(())
}

/// Character index of the first match, or -1
fn find(scope: &mut Scope) -> Result<(), Thrown> {
    let sub = scope.string("sub")?;
    let s = scope.string("string")?;
    let index = s
        .find(sub)
        .map(|byte| s[..byte].chars().count() as f64)
        .unwrap_or(-1.0);
    scope.set("index", Value::Num(index));
    Ok(())
}

fn replace(scope: &mut Scope) -> Result<(), Thrown> {
    let from = scope.string("__a")?;
    let to = scope.string("__b")?;
    let s = scope.string("string")?.replace(from, to);
    place_string(scope, s);
    Ok(())
}

fn to_num(scope: &mut Scope) -> Result<(), Thrown> {
    let s = scope.string("string")?.trim();
    let digits = s.strip_prefix('-').unwrap_or(s);
    let valid = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1
        && digits.chars().any(|c| c.is_ascii_digit());

    let parsed = valid.then(|| s.parse::<f64>().ok()).flatten();
    let Some(n) = parsed else {
        return Err(scope.throw(
            kinds::TYPE_ERROR,
            format!("cannot cast \"{s}\" to Num"),
        ));
    };
    scope.set("number", Value::Num(n));
    Ok(())
}

/// Every match of `re` in `string`. With one capture group the group is
/// collected instead; with several, each match yields an array of groups.
fn regex_matches(scope: &mut Scope) -> Result<(), Thrown> {
    let pattern = scope.string("re")?;
    let re = Regex::new(pattern).map_err(|e| {
        scope.throw(kinds::TYPE_ERROR, format!("invalid pattern \"{pattern}\": {e}"))
    })?;
    let text = scope.string("string")?;

    let group = |m: Option<Match<'_>>| {
        Value::Str(m.map(|m| m.as_str().to_string()).unwrap_or_default())
    };
    let matches = re
        .captures_iter(text)
        .map(|caps| match caps.len() {
            1 => group(caps.get(0)),
            2 => group(caps.get(1)),
            n => Value::Array((1..n).map(|i| group(caps.get(i))).collect()),
        })
        .collect();
    scope.set("matches", Value::Array(matches));
    Ok(())
}

/// False for `false`, empty or non-positive values, and the strings
/// `false`, `no`, `n`, `null`, `nil` in any case; true otherwise
fn to_bool(scope: &mut Scope) -> Result<(), Thrown> {
    let truth = match scope.require("value")? {
        Value::Bool(b) => *b,
        Value::Num(n) => *n > 0.0,
        Value::Array(items) => !items.is_empty(),
        Value::Str(s) => {
            !s.is_empty()
                && !matches!(
                    s.to_lowercase().as_str(),
                    "false" | "no" | "n" | "null" | "nil"
                )
        }
        _ => true,
    };
    scope.set("bool", Value::Bool(truth));
    Ok(())
}

/// Non-empty and every character numeric
fn is_num(scope: &mut Scope) -> Result<(), Thrown> {
    let s = scope.string("string")?;
    let numeric = !s.is_empty() && s.chars().all(char::is_numeric);
    scope.set("bool", Value::Bool(numeric));
    Ok(())
}

/// Has cased characters and none of them upper case
fn is_lower(scope: &mut Scope) -> Result<(), Thrown> {
    let s = scope.string("string")?;
    let lower = s.chars().any(char::is_lowercase) && !s.chars().any(char::is_uppercase);
    scope.set("bool", Value::Bool(lower));
    Ok(())
}

/// Has cased characters and none of them lower case
fn is_upper(scope: &mut Scope) -> Result<(), Thrown> {
    let s = scope.string("string")?;
    let upper = s.chars().any(char::is_uppercase) && !s.chars().any(char::is_lowercase);
    scope.set("bool", Value::Bool(upper));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn run(f: fn(&mut Scope) -> Result<(), Thrown>, pairs: &[(&str, Value)]) -> Result<Value, Thrown> {
        let bindings: BTreeMap<String, Value> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        let mut scope = Scope::new(bindings);
        f(&mut scope)?;
        Ok(scope.last_written().cloned().unwrap_or(Value::Bool(false)))
    }

    fn s(text: &str) -> Value {
        Value::Str(text.to_string())
    }

    #[test]
    fn test_case_and_strip() {
        assert_eq!(run(upper, &[("string", s("abc"))]).unwrap(), s("ABC"));
        assert_eq!(run(lower, &[("string", s("AbC"))]).unwrap(), s("abc"));
        assert_eq!(run(strip, &[("string", s("  x "))]).unwrap(), s("x"));
        assert_eq!(run(length, &[("string", s("héllo"))]).unwrap(), Value::Num(5.0));
    }

    #[test]
    fn test_substr() {
        let out = run(
            substr,
            &[("string", s("hello")), ("__a", Value::Num(1.0)), ("__b", Value::Num(3.0))],
        )
        .unwrap();
        assert_eq!(out, s("el"));

        let err = run(
            substr,
            &[("string", s("hi")), ("__a", Value::Num(0.0)), ("__b", Value::Num(5.0))],
        )
        .unwrap_err();
        assert_eq!(err.kind, kinds::INDEX_ERROR);
    }

    #[test]
    fn test_split_and_find() {
        let out = run(split, &[("string", s("me@host")), ("sub", s("@"))]).unwrap();
        assert_eq!(out, Value::Array(vec![s("me"), s("host")]));

        let out = run(find, &[("string", s("héllo")), ("sub", s("l"))]).unwrap();
        assert_eq!(out, Value::Num(2.0));
        let out = run(find, &[("string", s("abc")), ("sub", s("z"))]).unwrap();
        assert_eq!(out, Value::Num(-1.0));
    }

    #[test]
    fn test_replace() {
        let out = run(
            replace,
            &[("string", s("a-b-c")), ("__a", s("-")), ("__b", s("+"))],
        )
        .unwrap();
        assert_eq!(out, s("a+b+c"));
    }

    #[test]
    fn test_to_num() {
        assert_eq!(run(to_num, &[("string", s("3.25"))]).unwrap(), Value::Num(3.25));
        assert_eq!(run(to_num, &[("string", s("-4"))]).unwrap(), Value::Num(-4.0));
        assert!(run(to_num, &[("string", s("1.2.3"))]).is_err());
        assert!(run(to_num, &[("string", s("abc"))]).is_err());
    }

    #[test]
    fn test_regex() {
        let out = run(regex_matches, &[("string", s("a1 b22 c")), ("re", s(r"\d+"))]).unwrap();
        assert_eq!(out, Value::Array(vec![s("1"), s("22")]));

        let out = run(regex_matches, &[("string", s("k=v x=y")), ("re", s(r"(\w)=\w"))]).unwrap();
        assert_eq!(out, Value::Array(vec![s("k"), s("x")]));

        let out = run(regex_matches, &[("string", s("k=v")), ("re", s(r"(\w)=(\w)"))]).unwrap();
        assert_eq!(out, Value::Array(vec![Value::Array(vec![s("k"), s("v")])]));

        let out = run(regex_matches, &[("string", s("abc")), ("re", s("z"))]).unwrap();
        assert_eq!(out, Value::Array(Vec::new()));

        let err = run(regex_matches, &[("string", s("abc")), ("re", s("("))]).unwrap_err();
        assert_eq!(err.kind, kinds::TYPE_ERROR);
    }

    #[test]
    fn test_to_bool() {
        let falsy = [
            s(""),
            s("No"),
            s("NIL"),
            s("false"),
            Value::Num(0.0),
            Value::Num(-2.0),
            Value::Bool(false),
            Value::Array(Vec::new()),
        ];
        for value in falsy {
            assert_eq!(run(to_bool, &[("value", value)]).unwrap(), Value::Bool(false));
        }
        for value in [s("yes"), s("0"), Value::Num(0.5), Value::Array(vec![Value::Num(0.0)])] {
            assert_eq!(run(to_bool, &[("value", value)]).unwrap(), Value::Bool(true));
        }
    }

    #[test]
    fn test_is_num() {
        assert_eq!(run(is_num, &[("string", s("123"))]).unwrap(), Value::Bool(true));
        assert_eq!(run(is_num, &[("string", s("1.5"))]).unwrap(), Value::Bool(false));
        assert_eq!(run(is_num, &[("string", s(""))]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_case_predicates() {
        assert_eq!(run(is_lower, &[("string", s("abc 1!"))]).unwrap(), Value::Bool(true));
        assert_eq!(run(is_lower, &[("string", s("aBc"))]).unwrap(), Value::Bool(false));
        assert_eq!(run(is_lower, &[("string", s("123"))]).unwrap(), Value::Bool(false));
        assert_eq!(run(is_upper, &[("string", s("ABC-2"))]).unwrap(), Value::Bool(true));
        assert_eq!(run(is_upper, &[("string", s("AbC"))]).unwrap(), Value::Bool(false));

        let err = run(is_upper, &[("string", Value::Num(1.0))]).unwrap_err();
        assert_eq!(err.kind, kinds::TYPE_ERROR);
    }

    #[test]
    fn test_type_check() {
        let err = run(upper, &[("string", Value::Num(1.0))]).unwrap_err();
        assert_eq!(err.kind, kinds::TYPE_ERROR);
    }
}
