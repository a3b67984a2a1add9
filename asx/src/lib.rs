//! ASX scripting language
//!
//! Indentation-structured source is normalized, classified into a nested
//! statement tree, then walked by a tree-walking interpreter with global,
//! function-registry and persistent function-local memory. Native
//! functions ("mixins") plug in through [`mixin::MixinModule`].

pub mod ast;
pub mod config;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod mixin;
pub mod normalize;
pub mod parser;
pub mod resolver;

pub use ast::{Program, Span, Spanned, Statement, Value};
pub use config::Config;
pub use error::{ParseError, Result, report_error};
pub use interp::{ErrorKind, Interpreter, RuntimeError};
pub use parser::{parse, parse_with};
