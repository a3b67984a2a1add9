//! Arithmetic lexer implementation using logos

mod token;

pub use token::Token;

use crate::ast::{ArithToken, Operator};
use crate::error::{ParseError, Result};
use logos::Logos;

/// Tokenize an arithmetic expression found on `line`
pub fn tokenize(source: &str, line: usize) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        match result {
            Ok(Token::Unknown(op)) => {
                return Err(ParseError::syntax(
                    format!("invalid equation: unknown operator `{op}`"),
                    line,
                ));
            }
            Ok(token) => tokens.push(token),
            Err(_) => {
                return Err(ParseError::syntax(
                    format!("invalid equation: unexpected {:?}", lexer.slice()),
                    line,
                ));
            }
        }
    }

    Ok(tokens)
}

/// Convert tokens into the flat operand/operator sequence
pub fn to_arithmetic(tokens: Vec<Token>, line: usize) -> Result<Vec<ArithToken>> {
    let seq: Vec<ArithToken> = tokens
        .into_iter()
        .map(|tok| match tok {
            Token::Number(n) => ArithToken::Num(n),
            Token::Str(s) => ArithToken::Str(s),
            Token::Ident(name) => ArithToken::Ident(name),
            Token::Plus => ArithToken::Op(Operator::Add),
            Token::Minus => ArithToken::Op(Operator::Sub),
            Token::Star => ArithToken::Op(Operator::Mul),
            Token::Slash => ArithToken::Op(Operator::Div),
            Token::Lt => ArithToken::Op(Operator::Lt),
            Token::Gt => ArithToken::Op(Operator::Gt),
            Token::EqEq => ArithToken::Op(Operator::Eq),
            Token::NotEq => ArithToken::Op(Operator::Ne),
            Token::LtEq => ArithToken::Op(Operator::Le),
            Token::GtEq => ArithToken::Op(Operator::Ge),
            // Rejected by `tokenize`
            Token::Unknown(s) => ArithToken::Ident(s),
        })
        .collect();

    // operand (op operand)*
    let alternates = seq
        .iter()
        .enumerate()
        .all(|(i, tok)| tok.is_operand() == (i % 2 == 0));
    if seq.is_empty() || seq.len() % 2 == 0 || !alternates {
        return Err(ParseError::syntax("invalid equation", line));
    }

    Ok(seq)
}

/// Tokenize and shape-check an arithmetic expression
pub fn arithmetic(source: &str, line: usize) -> Result<Vec<ArithToken>> {
    to_arithmetic(tokenize(source, line)?, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_empty() {
        let tokens = tokenize("", 1).unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_tokenize_operators() {
        let tokens = tokenize("+ - * /", 1).unwrap();
        assert_eq!(tokens, vec![Token::Plus, Token::Minus, Token::Star, Token::Slash]);
    }

    #[test]
    fn test_tokenize_comparison_operators() {
        let tokens = tokenize("== != < > <= >=", 1).unwrap();
        assert_eq!(
            tokens,
            vec![Token::EqEq, Token::NotEq, Token::Lt, Token::Gt, Token::LtEq, Token::GtEq]
        );
    }

    #[test]
    fn test_tokenize_without_spaces() {
        let tokens = tokenize("x+3.5", 1).unwrap();
        assert_eq!(
            tokens,
            vec![Token::Ident("x".to_string()), Token::Plus, Token::Number(3.5)]
        );
    }

    #[test]
    fn test_tokenize_rejects_unknown_operator_run() {
        let err = tokenize("x +- 1", 4).unwrap_err();
        assert_eq!(err.line(), Some(4));
        assert!(err.message().contains("+-"));

        assert!(tokenize("a % b", 1).is_err());
        assert!(tokenize("a =< b", 1).is_err());
    }

    #[test]
    fn test_tokenize_string_operand() {
        let tokens = tokenize(r#"name == "bob smith""#, 1).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("name".to_string()),
                Token::EqEq,
                Token::Str("bob smith".to_string()),
            ]
        );
        assert!(tokenize(r#"x + "open"#, 1).is_err());
    }

    #[test]
    fn test_arithmetic_sequence() {
        let seq = arithmetic("a * 2 >= 10", 1).unwrap();
        assert_eq!(
            seq,
            vec![
                ArithToken::Ident("a".to_string()),
                ArithToken::Op(Operator::Mul),
                ArithToken::Num(2.0),
                ArithToken::Op(Operator::Ge),
                ArithToken::Num(10.0),
            ]
        );
    }

    #[test]
    fn test_arithmetic_requires_alternation() {
        assert!(arithmetic("1 +", 1).is_err());
        assert!(arithmetic("- 1", 1).is_err());
        assert!(arithmetic("a b", 1).is_err());
        assert!(arithmetic("", 1).is_err());
    }
}
