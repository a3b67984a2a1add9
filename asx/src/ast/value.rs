//! Value AST nodes

use serde::{Deserialize, Serialize};

/// A parsed value: a literal, a reference, a call or an arithmetic sequence.
///
/// Memory only ever holds the literal variants (`Num`, `Str`, `Bool` and
/// `Array`s of those); the remaining variants are resolved at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Numeric literal
    Num(f64),
    /// String literal (quotes stripped)
    Str(String),
    /// Boolean literal
    Bool(bool),
    /// Array literal
    Array(Vec<Value>),
    /// Bare variable reference
    Var(String),
    /// Indexed element: `base[index]`
    Element { base: String, index: i64 },
    /// Qualified call: `module.name(params)`
    Call {
        module: Option<String>,
        name: String,
        params: Vec<Value>,
    },
    /// Flat operand/operator sequence, evaluated left to right
    Arithmetic(Vec<ArithToken>),
}

/// One item of an arithmetic sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArithToken {
    Num(f64),
    Str(String),
    Ident(String),
    Op(Operator),
}

impl ArithToken {
    pub fn is_operand(&self) -> bool {
        !matches!(self, ArithToken::Op(_))
    }
}

/// Arithmetic and comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Eq,
    Ne,
    Le,
    Ge,
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Add => write!(f, "+"),
            Operator::Sub => write!(f, "-"),
            Operator::Mul => write!(f, "*"),
            Operator::Div => write!(f, "/"),
            Operator::Lt => write!(f, "<"),
            Operator::Gt => write!(f, ">"),
            Operator::Eq => write!(f, "=="),
            Operator::Ne => write!(f, "!="),
            Operator::Le => write!(f, "<="),
            Operator::Ge => write!(f, ">="),
        }
    }
}

impl std::fmt::Display for ArithToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArithToken::Num(n) => write!(f, "{n}"),
            ArithToken::Str(s) => write!(f, "\"{s}\""),
            ArithToken::Ident(name) => write!(f, "{name}"),
            ArithToken::Op(op) => write!(f, "{op}"),
        }
    }
}

/// Source form of a value; parsing the output yields the same value.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Array(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            Value::Var(name) => write!(f, "{name}"),
            Value::Element { base, index } => write!(f, "{base}[{index}]"),
            Value::Call {
                module,
                name,
                params,
            } => {
                if let Some(module) = module {
                    write!(f, "{module}.")?;
                }
                write!(f, "{name}(")?;
                write_list(f, params)?;
                write!(f, ")")
            }
            Value::Arithmetic(tokens) => {
                for (i, tok) in tokens.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{tok}")?;
                }
                Ok(())
            }
        }
    }
}

/// Comma-separated list of values in source form
pub fn write_list(f: &mut std::fmt::Formatter<'_>, values: &[Value]) -> std::fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}
