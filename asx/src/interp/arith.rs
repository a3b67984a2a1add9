//! Left-to-right evaluation of arithmetic sequences
//!
//! There is no precedence: `1 + 2 * 3` is `(1 + 2) * 3`.

use super::error::{InterpResult, RuntimeError};
use crate::ast::{ArithToken, Operator, Value};

/// Evaluate a sequence, resolving identifiers through `lookup`
pub fn evaluate<F>(tokens: &[ArithToken], lookup: F) -> InterpResult<Value>
where
    F: Fn(&str) -> InterpResult<Value>,
{
    let operand = |tok: &ArithToken| match tok {
        ArithToken::Num(n) => Ok(Value::Num(*n)),
        ArithToken::Str(s) => Ok(Value::Str(s.clone())),
        ArithToken::Ident(name) => lookup(name),
        ArithToken::Op(op) => Err(RuntimeError::type_mismatch(format!(
            "invalid equation: unexpected operator `{op}`"
        ))),
    };

    let mut iter = tokens.iter();
    let mut acc = match iter.next() {
        Some(tok) => operand(tok)?,
        None => return Err(RuntimeError::type_mismatch("invalid equation: empty")),
    };

    while let Some(tok) = iter.next() {
        let ArithToken::Op(op) = tok else {
            return Err(RuntimeError::type_mismatch(
                "invalid equation: expected an operator",
            ));
        };
        let rhs = iter.next().ok_or_else(|| {
            RuntimeError::type_mismatch(format!("invalid equation: missing operand after `{op}`"))
        })?;
        acc = apply(*op, acc, operand(rhs)?)?;
    }

    Ok(acc)
}

/// Apply one binary operator
pub fn apply(op: Operator, left: Value, right: Value) -> InterpResult<Value> {
    use Value::{Array, Bool, Num, Str};

    let result = match (op, left, right) {
        (Operator::Eq, l, r) => Bool(l == r),
        (Operator::Ne, l, r) => Bool(l != r),

        (Operator::Add, Num(a), Num(b)) => Num(a + b),
        (Operator::Add, Str(a), Str(b)) => Str(a + &b),
        (Operator::Add, Array(mut a), Array(b)) => {
            a.extend(b);
            Array(a)
        }
        (Operator::Sub, Num(a), Num(b)) => Num(a - b),
        (Operator::Mul, Num(a), Num(b)) => Num(a * b),
        (Operator::Div, Num(_), Num(b)) if b == 0.0 => {
            return Err(RuntimeError::division_by_zero());
        }
        (Operator::Div, Num(a), Num(b)) => Num(a / b),

        (Operator::Lt, Num(a), Num(b)) => Bool(a < b),
        (Operator::Gt, Num(a), Num(b)) => Bool(a > b),
        (Operator::Le, Num(a), Num(b)) => Bool(a <= b),
        (Operator::Ge, Num(a), Num(b)) => Bool(a >= b),
        (Operator::Lt, Str(a), Str(b)) => Bool(a < b),
        (Operator::Gt, Str(a), Str(b)) => Bool(a > b),
        (Operator::Le, Str(a), Str(b)) => Bool(a <= b),
        (Operator::Ge, Str(a), Str(b)) => Bool(a >= b),

        (op, l, r) => {
            return Err(RuntimeError::type_mismatch(format!(
                "unsupported operand types for {op}: {} and {}",
                l.type_name(),
                r.type_name()
            )));
        }
    };

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::ErrorKind;
    use crate::lexer::arithmetic;

    fn eval(src: &str) -> InterpResult<Value> {
        let tokens = arithmetic(src, 1).unwrap();
        evaluate(&tokens, |name| match name {
            "x" => Ok(Value::Num(4.0)),
            "s" => Ok(Value::Str("ab".to_string())),
            other => Err(RuntimeError::undefined_variable(other)),
        })
    }

    #[test]
    fn test_left_to_right() {
        assert_eq!(eval("1 + 2 * 3").unwrap(), Value::Num(9.0));
        assert_eq!(eval("x - 1 / 3").unwrap(), Value::Num(1.0));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("x > 3").unwrap(), Value::Bool(true));
        assert_eq!(eval("x * 2 <= 7").unwrap(), Value::Bool(false));
        assert_eq!(eval(r#"s == "ab""#).unwrap(), Value::Bool(true));
        assert_eq!(eval(r#"s < "b""#).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_string_concat() {
        assert_eq!(eval(r#"s + "c""#).unwrap(), Value::Str("abc".to_string()));
    }

    #[test]
    fn test_array_concat() {
        let joined = apply(
            Operator::Add,
            Value::Array(vec![Value::Num(1.0)]),
            Value::Array(vec![Value::Num(2.0)]),
        )
        .unwrap();
        assert_eq!(joined, Value::Array(vec![Value::Num(1.0), Value::Num(2.0)]));
    }

    #[test]
    fn test_division_by_zero() {
        let err = eval("x / 0").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(eval("s - 1").unwrap_err().kind, ErrorKind::TypeError);
        assert_eq!(eval(r#"x + "a""#).unwrap_err().kind, ErrorKind::TypeError);
    }

    #[test]
    fn test_undefined_operand() {
        assert_eq!(eval("y + 1").unwrap_err().kind, ErrorKind::UndefinedVariable);
    }
}
