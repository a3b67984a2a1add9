//! Render a statement tree back to ASX source

use super::{Block, Program, Statement, write_list};
use std::fmt::{self, Write};

/// Render a program with the given indentation width (in spaces)
pub fn render(program: &Program, unit: usize) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = render_block(&mut out, &program.statements, 0, unit);
    out
}

fn render_block(out: &mut String, block: &Block, depth: usize, unit: usize) -> fmt::Result {
    for stmt in block {
        let pad = " ".repeat(depth * unit);
        writeln!(out, "{pad}{}", Header(&stmt.node))?;
        if let Some(body) = stmt.node.body() {
            render_block(out, body, depth + 1, unit)?;
        }
    }
    Ok(())
}

/// The single source line of a statement (block headers without their body)
struct Header<'a>(&'a Statement);

impl fmt::Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Statement::Assignment { var, value } => write!(f, "{var} = {value}"),
            Statement::Builtin { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, " ")?;
                    write_list(f, args)?;
                }
                Ok(())
            }
            Statement::Call { name, args } => {
                write!(f, "{name}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Statement::FunctionDef {
                name, parameters, ..
            } => write!(f, "#{name}({}):", parameters.join(", ")),
            Statement::Conditional {
                kind, condition, ..
            } => {
                write!(f, "{kind}")?;
                if let Some(tokens) = condition {
                    for tok in tokens {
                        write!(f, " {tok}")?;
                    }
                }
                write!(f, ":")
            }
            Statement::Import { module } => write!(f, "import {module}"),
            Statement::Mixin { name } => write!(f, "@mixin {name}"),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Header(self), f)
    }
}
