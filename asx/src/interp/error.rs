//! Runtime errors for the interpreter

use crate::error::ParseError;
use std::fmt;
use std::path::PathBuf;

/// Runtime error during execution
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Line of the statement that raised it, once known
    pub line: Option<usize>,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    UndefinedVariable,
    UndefinedFunction,
    UndefinedMixin,
    ModuleNotFound,
    IndexError,
    TypeError,
    DivisionByZero,
    CircularImport,
    /// Raised while parsing an imported module
    SyntaxError,
    /// Raised while normalizing an imported module
    IndentationError,
    IoError,
    /// Kind thrown by a mixin that the engine has no name for
    Thrown(String),
}

impl ErrorKind {
    /// Name as shown in `[ERROR] | <Kind> ...`
    pub fn name(&self) -> &str {
        match self {
            ErrorKind::UndefinedVariable => "UndefinedVariable",
            ErrorKind::UndefinedFunction => "UndefinedFunction",
            ErrorKind::UndefinedMixin => "UndefinedMixin",
            ErrorKind::ModuleNotFound => "ModuleNotFound",
            ErrorKind::IndexError => "IndexError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::DivisionByZero => "DivisionByZero",
            ErrorKind::CircularImport => "CircularImport",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::IndentationError => "IndentationError",
            ErrorKind::IoError => "IOError",
            ErrorKind::Thrown(kind) => kind,
        }
    }

    /// Map a kind thrown by a mixin onto the engine's kinds
    pub fn from_thrown(kind: &str) -> Self {
        match kind {
            "TypeError" => ErrorKind::TypeError,
            "IndexError" => ErrorKind::IndexError,
            "UndefinedVariable" => ErrorKind::UndefinedVariable,
            "IoError" | "IOError" => ErrorKind::IoError,
            other => ErrorKind::Thrown(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
            line: None,
        }
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedVariable, format!("`{name}` is not defined"))
    }

    pub fn undefined_function(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedFunction, format!("`{name}` is not a function"))
    }

    pub fn undefined_mixin(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedMixin, format!("no mixin named `{name}`"))
    }

    pub fn module_not_found(name: &str, searched: &[PathBuf]) -> Self {
        let paths: Vec<String> = searched.iter().map(|p| p.display().to_string()).collect();
        Self::new(
            ErrorKind::ModuleNotFound,
            format!("module `{name}` not found (searched {})", paths.join(", ")),
        )
    }

    pub fn index_error(base: &str, index: i64, len: usize) -> Self {
        Self::new(
            ErrorKind::IndexError,
            format!("index {index} out of range for `{base}` of length {len}"),
        )
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::TypeError,
            format!("expected {expected}, got {got}"),
        )
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero")
    }

    pub fn circular_import(name: &str) -> Self {
        Self::new(
            ErrorKind::CircularImport,
            format!("module `{name}` is already being imported"),
        )
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoError, message)
    }

    /// Attach a line unless a more precise one is already set
    pub fn at(mut self, line: usize) -> Self {
        self.line.get_or_insert(line);
        self
    }
}

impl From<ParseError> for RuntimeError {
    fn from(err: ParseError) -> Self {
        let kind = match &err {
            ParseError::Indentation { .. } => ErrorKind::IndentationError,
            ParseError::Syntax { .. } => ErrorKind::SyntaxError,
            ParseError::Io { .. } => ErrorKind::IoError,
        };
        RuntimeError {
            kind,
            message: err.message().to_string(),
            line: err.line(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} @ line {line}: {}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_variable() {
        let err = RuntimeError::undefined_variable("foo");
        assert_eq!(err.kind, ErrorKind::UndefinedVariable);
        assert!(err.message.contains("foo"));
        assert_eq!(err.line, None);
    }

    #[test]
    fn test_display_with_line() {
        let err = RuntimeError::division_by_zero().at(7);
        assert_eq!(err.to_string(), "DivisionByZero @ line 7: division by zero");
    }

    #[test]
    fn test_innermost_line_wins() {
        let err = RuntimeError::undefined_function("f").at(3).at(9);
        assert_eq!(err.line, Some(3));
    }

    #[test]
    fn test_module_not_found_lists_paths() {
        let err = RuntimeError::module_not_found(
            "missing_module",
            &[PathBuf::from("std/missing_module.asx")],
        );
        assert_eq!(err.kind, ErrorKind::ModuleNotFound);
        assert!(err.message.contains("missing_module"));
        assert!(err.message.contains("std/missing_module.asx"));
    }

    #[test]
    fn test_thrown_kind_mapping() {
        assert_eq!(ErrorKind::from_thrown("TypeError"), ErrorKind::TypeError);
        assert_eq!(ErrorKind::from_thrown("IoError"), ErrorKind::IoError);
        assert_eq!(
            ErrorKind::from_thrown("ParamError"),
            ErrorKind::Thrown("ParamError".to_string())
        );
        assert_eq!(ErrorKind::Thrown("ParamError".to_string()).name(), "ParamError");
    }

    #[test]
    fn test_from_parse_error_keeps_line() {
        let err: RuntimeError = ParseError::syntax("invalid equation", 4).into();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
        assert_eq!(err.line, Some(4));
    }
}
