//! Statement classifier and structural builder
//!
//! Every non-blank line is classified exactly once against [`PRIORITY`],
//! then a recursive descent over the classified lines folds indented lines
//! into the body of the header above them.

mod args;


pub use args::{parse_args, parse_value};

use crate::ast::{Block, ConditionalKind, Program, Span, Spanned, Statement};
use crate::error::{ParseError, Result};
use crate::lexer;
use crate::normalize::{Normalizer, SourceLine, mask_strings};
use std::iter::Peekable;
use std::vec::IntoIter;

/// Parse ASX source with the default indentation unit
pub fn parse(source: &str) -> Result<Program> {
    parse_with(&Normalizer::default(), source)
}

/// Parse ASX source with a configured normalizer
pub fn parse_with(normalizer: &Normalizer, source: &str) -> Result<Program> {
    let normalized = normalizer.normalize(source)?;
    build(&normalized.lines)
}

/// Build the statement tree from normalized lines
pub fn build(lines: &[SourceLine]) -> Result<Program> {
    let classified = lines
        .iter()
        .filter(|l| !l.is_blank())
        .map(|l| {
            Ok(Classified {
                line: l.line_number,
                indent: l.indent_level,
                stmt: classify_line(&l.text, l.line_number)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut builder = Builder {
        lines: classified.into_iter().peekable(),
    };
    let statements = builder.block(0)?;
    Ok(Program { statements })
}

/// Shapes a line can take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape {
    Import,
    If,
    While,
    Elif,
    Else,
    Try,
    FunctionHeader,
    Assignment,
    Statement,
    Call,
    Mixin,
}

/// Classification order; the first matching shape wins
pub const PRIORITY: [LineShape; 11] = [
    LineShape::Import,
    LineShape::If,
    LineShape::While,
    LineShape::Elif,
    LineShape::Else,
    LineShape::Try,
    LineShape::FunctionHeader,
    LineShape::Assignment,
    LineShape::Statement,
    LineShape::Call,
    LineShape::Mixin,
];

impl LineShape {
    fn keyword(self) -> Option<&'static str> {
        Some(match self {
            LineShape::Import => "import",
            LineShape::If => "if",
            LineShape::While => "while",
            LineShape::Elif => "elif",
            LineShape::Else => "else",
            LineShape::Try => "try",
            LineShape::Mixin => "@mixin",
            _ => return None,
        })
    }

    /// Does `text` (with `masked` as its string-masked twin) have this shape
    fn matches(self, text: &str, masked: &str) -> bool {
        if let Some(kw) = self.keyword() {
            return starts_with_keyword(text, kw);
        }
        match self {
            LineShape::FunctionHeader => text.starts_with('#'),
            LineShape::Assignment => assignment_split(masked)
                .is_some_and(|eq| is_ident(text[..eq].trim())),
            LineShape::Statement => {
                let head = text.split_whitespace().next().unwrap_or_default();
                is_ident(head)
            }
            LineShape::Call => text
                .split_once('(')
                .is_some_and(|(name, _)| is_ident(name.trim())),
            _ => false,
        }
    }
}

/// Classify one line and parse it into a statement (bodies left empty)
pub fn classify(text: &str, line: usize) -> Result<LineShape> {
    let masked = mask_strings(text, line)?;
    PRIORITY
        .into_iter()
        .find(|shape| shape.matches(text, &masked))
        .ok_or_else(|| ParseError::syntax(format!("unrecognized statement `{text}`"), line))
}

fn classify_line(text: &str, line: usize) -> Result<Statement> {
    let shape = classify(text, line)?;
    tracing::trace!(line, ?shape, "classified");

    match shape {
        LineShape::Import => {
            let module = keyword_rest(text, "import");
            if module.is_empty() {
                return Err(ParseError::syntax("empty import", line));
            }
            if !is_ident(module) {
                return Err(ParseError::syntax(
                    format!("invalid module name `{module}`"),
                    line,
                ));
            }
            Ok(Statement::Import {
                module: module.to_string(),
            })
        }
        LineShape::If => conditional(text, ConditionalKind::If, line),
        LineShape::While => conditional(text, ConditionalKind::While, line),
        LineShape::Elif => conditional(text, ConditionalKind::Elif, line),
        LineShape::Else => conditional(text, ConditionalKind::Else, line),
        LineShape::Try => conditional(text, ConditionalKind::Try, line),
        LineShape::FunctionHeader => function_header(text, line),
        LineShape::Assignment => {
            let masked = mask_strings(text, line)?;
            let eq = assignment_split(&masked)
                .ok_or_else(|| ParseError::syntax("invalid assignment", line))?;
            Ok(Statement::Assignment {
                var: text[..eq].trim().to_string(),
                value: parse_value(&text[eq + 1..], line)?,
            })
        }
        LineShape::Statement => {
            let (name, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
            Ok(Statement::Builtin {
                name: name.to_string(),
                args: parse_args(rest, line)?,
            })
        }
        LineShape::Call => {
            let (name, rest) = text
                .split_once('(')
                .ok_or_else(|| ParseError::syntax("invalid call", line))?;
            let inner = rest
                .strip_suffix(')')
                .ok_or_else(|| ParseError::syntax("unbalanced parentheses", line))?;
            Ok(Statement::Call {
                name: name.trim().to_string(),
                args: parse_args(inner, line)?,
            })
        }
        LineShape::Mixin => {
            let name = keyword_rest(text, "@mixin");
            if name.is_empty() {
                return Err(ParseError::syntax("empty @mixin", line));
            }
            if name.contains(char::is_whitespace) {
                return Err(ParseError::syntax(format!("invalid mixin name `{name}`"), line));
            }
            Ok(Statement::Mixin {
                name: name.to_string(),
            })
        }
    }
}

/// `if cond:` / `elif cond:` / `while cond:` / `else:` / `try:`
fn conditional(text: &str, kind: ConditionalKind, line: usize) -> Result<Statement> {
    let keyword = kind.keyword();
    let header = keyword_rest(text, keyword)
        .strip_suffix(':')
        .ok_or_else(|| ParseError::syntax(format!("missing `:` after {keyword}"), line))?
        .trim();

    let condition = if kind.has_condition() {
        if header.is_empty() {
            return Err(ParseError::syntax(
                format!("missing condition after {keyword}"),
                line,
            ));
        }
        Some(lexer::arithmetic(header, line)?)
    } else {
        if !header.is_empty() {
            return Err(ParseError::syntax(
                format!("{keyword} takes no condition"),
                line,
            ));
        }
        None
    };

    Ok(Statement::Conditional {
        kind,
        condition,
        body: Vec::new(),
    })
}

/// `#name(a, b):`
fn function_header(text: &str, line: usize) -> Result<Statement> {
    let header = text[1..]
        .trim_end()
        .strip_suffix(':')
        .ok_or_else(|| ParseError::syntax("missing `:` after function header", line))?
        .trim_end();

    let (name, rest) = header
        .split_once('(')
        .ok_or_else(|| ParseError::syntax("missing `(` in function header", line))?;
    let params = rest
        .strip_suffix(')')
        .filter(|inner| !inner.contains(['(', ')']))
        .ok_or_else(|| ParseError::syntax("unbalanced parentheses in function header", line))?;

    let name = name.trim();
    if !is_ident(name) {
        return Err(ParseError::syntax(format!("invalid function name `{name}`"), line));
    }

    let parameters = if params.trim().is_empty() {
        Vec::new()
    } else {
        params
            .split(',')
            .map(|p| {
                let p = p.trim();
                if is_ident(p) {
                    Ok(p.to_string())
                } else {
                    Err(ParseError::syntax(format!("invalid parameter name `{p}`"), line))
                }
            })
            .collect::<Result<Vec<_>>>()?
    };

    Ok(Statement::FunctionDef {
        name: name.to_string(),
        parameters,
        body: Vec::new(),
    })
}

/// Byte offset of a lone `=` (not part of `==`, `!=`, `<=` or `>=`)
fn assignment_split(masked: &str) -> Option<usize> {
    let bytes = masked.as_bytes();
    let eq = masked.find('=')?;
    let prev = eq.checked_sub(1).map(|i| bytes[i]);
    let next = bytes.get(eq + 1).copied();
    let lone = !matches!(prev, Some(b'=' | b'!' | b'<' | b'>')) && next != Some(b'=');
    lone.then_some(eq)
}

/// `kw` followed by the end of the line, whitespace or `:`
fn starts_with_keyword(text: &str, kw: &str) -> bool {
    text.strip_prefix(kw)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == ':'))
}

fn keyword_rest<'a>(text: &'a str, kw: &str) -> &'a str {
    text.strip_prefix(kw).unwrap_or(text).trim()
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct Classified {
    line: usize,
    indent: usize,
    stmt: Statement,
}

/// Recursive descent over classified lines
struct Builder {
    lines: Peekable<IntoIter<Classified>>,
}

impl Builder {
    fn next_indent(&mut self) -> Option<(usize, usize)> {
        self.lines.peek().map(|c| (c.indent, c.line))
    }

    /// Collect every statement at exactly `level` until a shallower line
    fn block(&mut self, level: usize) -> Result<Block> {
        let mut block = Vec::new();

        while let Some((indent, line)) = self.next_indent() {
            if indent < level {
                break;
            }
            if indent > level {
                return Err(ParseError::indentation("unexpected indent", line));
            }

            let Some(Classified { line, mut stmt, .. }) = self.lines.next() else {
                break;
            };

            if let Some(body) = body_mut(&mut stmt) {
                if let Some((body_level, _)) = self.next_indent().filter(|(i, _)| *i > level) {
                    *body = self.block(body_level)?;

                    if let Some((after, after_line)) = self.next_indent() {
                        if after > level {
                            return Err(ParseError::indentation(
                                "inconsistent dedent",
                                after_line,
                            ));
                        }
                    }
                }
            }

            block.push(Spanned::new(stmt, Span::new(line)));
        }

        Ok(block)
    }
}

fn body_mut(stmt: &mut Statement) -> Option<&mut Block> {
    match stmt {
        Statement::FunctionDef { body, .. } | Statement::Conditional { body, .. } => Some(body),
        _ => None,
    }
}
