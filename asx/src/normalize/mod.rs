//! ASX source normalizer
//!
//! Turns raw source text into one [`SourceLine`] per physical line:
//! - Block comments (`/-- ... --/`) and line comments (`-- ...`) are removed
//! - String literals are masked while scanning so `--` inside quotes survives
//! - The indentation unit is inferred from the first indented line
//! - Blank lines are kept with empty text so line numbers stay stable

use crate::error::{ParseError, Result};
use serde::Serialize;

/// Indentation unit used when no line is indented
pub const DEFAULT_TAB_UNIT: usize = 4;

const BLOCK_COMMENT_OPEN: &str = "/--";
const BLOCK_COMMENT_CLOSE: &str = "--/";
const LINE_COMMENT: &str = "--";

/// Replaces every byte of a string literal (quotes included) during scanning
pub const MASK: char = '\0';

/// One normalized physical line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    /// 1-based physical line number
    pub line_number: usize,
    /// Leading whitespace width divided by the tab unit
    pub indent_level: usize,
    /// Trimmed, comment-free text; empty for blank lines
    pub text: String,
}

impl SourceLine {
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Normalizer output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub lines: Vec<SourceLine>,
    pub tab_unit: usize,
}

/// Source normalizer state
#[derive(Debug, Clone)]
pub struct Normalizer {
    default_tab_unit: usize,
}

impl Normalizer {
    /// Create a normalizer with the given fallback indentation unit
    pub fn new(default_tab_unit: usize) -> Self {
        Self {
            default_tab_unit: default_tab_unit.max(1),
        }
    }

    /// Normalize a whole source file
    pub fn normalize(&self, source: &str) -> Result<Normalized> {
        let mut code: Vec<String> = source.lines().map(str::to_string).collect();

        strip_block_comments(&mut code);

        for (index, line) in code.iter_mut().enumerate() {
            *line = strip_line_comment(line, index + 1)?;
        }

        let tab_unit = infer_tab_unit(&code).unwrap_or(self.default_tab_unit);

        let mut lines = Vec::with_capacity(code.len());
        for (index, line) in code.iter().enumerate() {
            let line_number = index + 1;
            let text = line.trim();
            if text.is_empty() {
                lines.push(SourceLine {
                    line_number,
                    indent_level: 0,
                    text: String::new(),
                });
                continue;
            }

            let width = leading_width(line);
            if width % tab_unit != 0 {
                return Err(ParseError::indentation(
                    format!("invalid tab size: {width} is not a multiple of {tab_unit}"),
                    line_number,
                ));
            }

            lines.push(SourceLine {
                line_number,
                indent_level: width / tab_unit,
                text: text.to_string(),
            });
        }

        tracing::trace!(lines = lines.len(), tab_unit, "normalized source");
        Ok(Normalized { lines, tab_unit })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_UNIT)
    }
}

/// Convenience function to normalize with the default indentation unit
pub fn normalize(source: &str) -> Result<Vec<SourceLine>> {
    Normalizer::default().normalize(source).map(|n| n.lines)
}

/// Mask string literals so delimiters inside them are ignored.
///
/// The output has the same byte length as the input; every byte of every
/// `"..."` literal becomes [`MASK`].
pub fn mask_strings(text: &str, line: usize) -> Result<String> {
    let mut masked = String::with_capacity(text.len());
    let mut in_string = false;

    for c in text.chars() {
        if c == '"' {
            in_string = !in_string;
            masked.push(MASK);
        } else if in_string {
            for _ in 0..c.len_utf8() {
                masked.push(MASK);
            }
        } else {
            masked.push(c);
        }
    }

    if in_string {
        return Err(ParseError::syntax("incorrect string formatting: unterminated string", line));
    }
    Ok(masked)
}

/// Blank every line of every `/-- ... --/` region
fn strip_block_comments(code: &mut [String]) {
    let mut in_comment = false;

    for line in code.iter_mut() {
        let trimmed = line.trim();
        if in_comment {
            if trimmed.ends_with(BLOCK_COMMENT_CLOSE) {
                in_comment = false;
            }
            line.clear();
        } else if trimmed.starts_with(BLOCK_COMMENT_OPEN) {
            // A one-line block comment needs a closer after the opener
            let rest = &trimmed[BLOCK_COMMENT_OPEN.len()..];
            in_comment = !rest.ends_with(BLOCK_COMMENT_CLOSE) && rest != "/";
            line.clear();
        }
    }
}

/// Drop everything from the first unquoted `--`
fn strip_line_comment(line: &str, line_number: usize) -> Result<String> {
    let masked = mask_strings(line, line_number)?;
    let kept = match masked.find(LINE_COMMENT) {
        Some(pos) => &line[..pos],
        None => line,
    };
    Ok(kept.trim_end().to_string())
}

/// Width of the first indented non-blank line
fn infer_tab_unit(code: &[String]) -> Option<usize> {
    code.iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_width(line))
        .find(|width| *width > 0)
}

fn leading_width(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}
