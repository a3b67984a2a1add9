//! Statement tree definitions

mod render;
mod span;
mod value;

pub use render::render;
pub use span::*;
pub use value::*;

use serde::{Deserialize, Serialize};

/// A program is a sequence of top-level statements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Block,
}

/// An ordered statement body
pub type Block = Vec<Spanned<Statement>>;

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// `name = value`
    Assignment { var: String, value: Value },

    /// `name arg, arg...`, dispatched by name at runtime
    Builtin { name: String, args: Vec<Value> },

    /// `name(args)`, a user function call
    Call { name: String, args: Vec<Value> },

    /// `#name(params):` followed by an indented body
    FunctionDef {
        name: String,
        parameters: Vec<String>,
        body: Block,
    },

    /// `if`/`elif`/`while` with a condition, `else`/`try` without
    Conditional {
        kind: ConditionalKind,
        condition: Option<Vec<ArithToken>>,
        body: Block,
    },

    /// `import name`
    Import { module: String },

    /// `@mixin Lib.name`
    Mixin { name: String },
}

impl Statement {
    /// Body of a block-shaped statement
    pub fn body(&self) -> Option<&Block> {
        match self {
            Statement::FunctionDef { body, .. } | Statement::Conditional { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }
}

/// Conditional block kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionalKind {
    If,
    Elif,
    Else,
    Try,
    While,
}

impl ConditionalKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ConditionalKind::If => "if",
            ConditionalKind::Elif => "elif",
            ConditionalKind::Else => "else",
            ConditionalKind::Try => "try",
            ConditionalKind::While => "while",
        }
    }

    /// Whether the header carries a condition
    pub fn has_condition(self) -> bool {
        matches!(
            self,
            ConditionalKind::If | ConditionalKind::Elif | ConditionalKind::While
        )
    }
}

impl std::fmt::Display for ConditionalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}
