//! Tree-walking interpreter for ASX programs

mod arith;
mod builtins;
mod error;
mod eval;
mod memory;
mod value;

pub use builtins::BuiltinFn;
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::{Interpreter, Output};
pub use memory::{Function, Memory};
pub use value::Printed;
