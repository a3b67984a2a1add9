//! Value and argument list parsing
//!
//! A raw token is classified in this order:
//! number, `true`/`false`, array, string, dotted call, element, identifier,
//! and finally an arithmetic sequence when the token holds operator characters.

use super::is_ident;
use crate::ast::Value;
use crate::error::{ParseError, Result};
use crate::lexer;
use crate::normalize::{MASK, mask_strings};

/// Parse a comma-separated argument list
pub fn parse_args(text: &str, line: usize) -> Result<Vec<Value>> {
    split_top_level(text, line)?
        .into_iter()
        .map(|token| parse_value(token, line))
        .collect()
}

/// Parse a single value token
pub fn parse_value(token: &str, line: usize) -> Result<Value> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ParseError::syntax("missing value", line));
    }

    if let Some(n) = parse_number(token, line)? {
        return Ok(Value::Num(n));
    }

    match token {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    let masked = mask_strings(token, line)?;

    if let Some(inner) = array_body(token, &masked) {
        return parse_args(inner, line).map(Value::Array);
    }

    if is_string_literal(token, &masked) {
        return Ok(Value::Str(token[1..token.len() - 1].to_string()));
    }

    if let Some(call) = parse_call(token, line)? {
        return Ok(call);
    }

    if let Some(element) = parse_element(token, line)? {
        return Ok(element);
    }

    if is_ident(token) {
        return Ok(Value::Var(token.to_string()));
    }

    if token.chars().any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
        return lexer::arithmetic(token, line).map(Value::Arithmetic);
    }

    Err(ParseError::syntax(format!("invalid value `{token}`"), line))
}

/// Split at commas outside quotes and outside `[]`/`()` nesting
pub(crate) fn split_top_level(text: &str, line: usize) -> Result<Vec<&str>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let masked = mask_strings(text, line)?;
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, b) in masked.bytes().enumerate() {
        match b {
            b'[' | b'(' => depth += 1,
            b']' | b')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ParseError::syntax("unbalanced brackets", line))?;
            }
            b',' if depth == 0 => {
                pieces.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ParseError::syntax("unbalanced brackets", line));
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .map(|piece| {
            let piece = piece.trim();
            if piece.is_empty() {
                Err(ParseError::syntax("empty argument", line))
            } else {
                Ok(piece)
            }
        })
        .collect()
}

/// Strict numeric literal: optional sign, digits, fraction and exponent.
/// Words such as `inf` or `nan` are identifiers, not numbers; a literal
/// that overflows `f64` is an error.
fn parse_number(token: &str, line: usize) -> Result<Option<f64>> {
    let numeric = token
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !numeric || !token.chars().any(|c| c.is_ascii_digit()) {
        return Ok(None);
    }
    match token.parse::<f64>() {
        Ok(n) if !n.is_finite() => Err(ParseError::syntax(
            format!("number `{token}` out of range"),
            line,
        )),
        Ok(n) => Ok(Some(n)),
        Err(_) => Ok(None),
    }
}

/// One quoted string: quotes only at the two ends
fn is_string_literal(token: &str, masked: &str) -> bool {
    token.len() >= 2
        && token.starts_with('"')
        && token.ends_with('"')
        && token.matches('"').count() == 2
        && masked.chars().all(|c| c == MASK)
}

/// Inner text of `[...]` when the opening bracket closes at the very end
fn array_body<'a>(token: &'a str, masked: &str) -> Option<&'a str> {
    if !masked.starts_with('[') || !masked.ends_with(']') {
        return None;
    }

    let mut depth = 0usize;
    for (i, b) in masked.bytes().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (i == token.len() - 1).then(|| &token[1..i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// `Lib.name` or `Lib.name(args)`
fn parse_call(token: &str, line: usize) -> Result<Option<Value>> {
    let Some((module, rest)) = token.split_once('.') else {
        return Ok(None);
    };
    if !is_ident(module) {
        return Ok(None);
    }

    if is_ident(rest) {
        return Ok(Some(Value::Call {
            module: Some(module.to_string()),
            name: rest.to_string(),
            params: Vec::new(),
        }));
    }

    let Some(open) = rest.find('(') else {
        return Ok(None);
    };
    let name = &rest[..open];
    if !is_ident(name) || !rest.ends_with(')') {
        return Ok(None);
    }

    let params = parse_args(&rest[open + 1..rest.len() - 1], line)?;
    Ok(Some(Value::Call {
        module: Some(module.to_string()),
        name: name.to_string(),
        params,
    }))
}

/// `name[int]` with exactly one bracket pair
fn parse_element(token: &str, line: usize) -> Result<Option<Value>> {
    let Some(open) = token.find('[') else {
        return Ok(None);
    };
    let base = &token[..open];
    if !is_ident(base) {
        return Ok(None);
    }

    let invalid = || ParseError::syntax(format!("invalid element access `{token}`"), line);

    let inner = token[open + 1..].strip_suffix(']').ok_or_else(invalid)?;
    if inner.contains(['[', ']']) {
        return Err(invalid());
    }
    let index = inner.trim().parse::<i64>().map_err(|_| invalid())?;

    Ok(Some(Value::Element {
        base: base.to_string(),
        index,
    }))
}
