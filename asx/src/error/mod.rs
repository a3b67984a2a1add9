//! Parse error types and reporting

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ParseError>;

/// Error raised while normalizing or building a statement tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("IndentationError @ line {line}: {message}")]
    Indentation { message: String, line: usize },

    #[error("SyntaxError @ line {line}: {message}")]
    Syntax { message: String, line: usize },

    #[error("IOError: {message}")]
    Io { message: String },
}

impl ParseError {
    pub fn indentation(message: impl Into<String>, line: usize) -> Self {
        Self::Indentation {
            message: message.into(),
            line,
        }
    }

    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            line,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Indentation { line, .. } | Self::Syntax { line, .. } => Some(*line),
            Self::Io { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Indentation { message, .. } => message,
            Self::Syntax { message, .. } => message,
            Self::Io { message } => message,
        }
    }

    /// Error kind name as shown in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Indentation { .. } => "IndentationError",
            Self::Syntax { .. } => "SyntaxError",
            Self::Io { .. } => "IOError",
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::io_error(e.to_string())
    }
}

/// Byte range of a 1-based line inside `source`
fn line_range(source: &str, line: usize) -> std::ops::Range<usize> {
    let mut start = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let trimmed = text.trim_end_matches(['\n', '\r']);
            return start..start + trimmed.len();
        }
        start += text.len();
    }
    source.len()..source.len()
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &ParseError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let range = error
        .line()
        .map(|line| line_range(source, line))
        .unwrap_or(0..0);

    let report = Report::build(ReportKind::Error, (filename, range.clone()))
        .with_message(error.kind())
        .with_label(
            Label::new((filename, range))
                .with_message(error.message())
                .with_color(Color::Red),
        )
        .finish();

    if let Err(e) = report.eprint((filename, Source::from(source))) {
        tracing::warn!("failed to render diagnostic: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_tagged() {
        let err = ParseError::indentation("invalid tab size", 3);
        assert_eq!(err.to_string(), "IndentationError @ line 3: invalid tab size");
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.kind(), "IndentationError");
    }

    #[test]
    fn test_io_error_has_no_line() {
        let err: ParseError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.line(), None);
        assert!(err.message().contains("gone"));
    }

    #[test]
    fn test_line_range() {
        let src = "x = 1\r\nsay x\nwait 2";
        assert_eq!(&src[line_range(src, 1)], "x = 1");
        assert_eq!(&src[line_range(src, 2)], "say x");
        assert_eq!(&src[line_range(src, 3)], "wait 2");
        assert_eq!(line_range(src, 9), src.len()..src.len());
    }
}
