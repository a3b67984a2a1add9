//! Module resolver for `import`
//!
//! `import name` looks for `name.asx` in the standard-library directory,
//! then in the user directory. Parsed modules are cached by path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use crate::ast::Program;
use crate::error::ParseError;
use crate::normalize::Normalizer;

/// File extension of ASX sources
pub const EXTENSION: &str = "asx";

/// A resolved module
#[derive(Debug, Clone)]
pub struct Module {
    /// Module name as written after `import`
    pub name: String,
    /// File the module was loaded from
    pub path: PathBuf,
    /// Parsed statement tree
    pub program: Rc<Program>,
}

/// Module resolution failures
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("module `{name}` not found")]
    NotFound { name: String, searched: Vec<PathBuf> },

    #[error("failed to read module `{name}` at {}: {source}", path.display())]
    Io {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("in module `{name}`: {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },
}

/// Module resolver
#[derive(Debug)]
pub struct Resolver {
    std_dir: Option<PathBuf>,
    user_dir: PathBuf,
    normalizer: Normalizer,
    /// Parsed modules by path
    cache: HashMap<PathBuf, Rc<Program>>,
}

impl Resolver {
    /// Create a resolver searching `user_dir` only
    pub fn new<P: AsRef<Path>>(user_dir: P) -> Self {
        Self {
            std_dir: None,
            user_dir: user_dir.as_ref().to_path_buf(),
            normalizer: Normalizer::default(),
            cache: HashMap::new(),
        }
    }

    /// Search `dir` before the user directory
    pub fn with_std_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.std_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Candidate paths for `name`, in search order
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let file = format!("{name}.{EXTENSION}");
        self.std_dir
            .iter()
            .chain(std::iter::once(&self.user_dir))
            .map(|dir| dir.join(&file))
            .collect()
    }

    /// Resolve a module name to a file path
    pub fn resolve_module_path(&self, name: &str) -> Result<PathBuf, ResolveError> {
        let candidates = self.candidates(name);
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Ok(path.clone()),
            None => Err(ResolveError::NotFound {
                name: name.to_string(),
                searched: candidates,
            }),
        }
    }

    /// Resolve and parse a module, reusing an earlier parse of the same file
    pub fn load_module(&mut self, name: &str) -> Result<Module, ResolveError> {
        let path = self.resolve_module_path(name)?;

        if let Some(program) = self.cache.get(&path) {
            tracing::trace!(module = name, path = %path.display(), "module cache hit");
            return Ok(Module {
                name: name.to_string(),
                path,
                program: Rc::clone(program),
            });
        }

        let source = std::fs::read_to_string(&path).map_err(|source| ResolveError::Io {
            name: name.to_string(),
            path: path.clone(),
            source,
        })?;

        let program = self
            .normalizer
            .normalize(&source)
            .and_then(|normalized| crate::parser::build(&normalized.lines))
            .map_err(|source| ResolveError::Parse {
                name: name.to_string(),
                source,
            })?;

        tracing::debug!(module = name, path = %path.display(), "module loaded");
        let program = Rc::new(program);
        self.cache.insert(path.clone(), Rc::clone(&program));

        Ok(Module {
            name: name.to_string(),
            path,
            program,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_std_dir_wins() {
        let std_dir = tempfile::tempdir().unwrap();
        let user_dir = tempfile::tempdir().unwrap();
        fs::write(std_dir.path().join("util.asx"), "x = 1\n").unwrap();
        fs::write(user_dir.path().join("util.asx"), "x = 2\n").unwrap();

        let resolver = Resolver::new(user_dir.path()).with_std_dir(std_dir.path());
        let path = resolver.resolve_module_path("util").unwrap();
        assert_eq!(path, std_dir.path().join("util.asx"));
    }

    #[test]
    fn test_falls_back_to_user_dir() {
        let std_dir = tempfile::tempdir().unwrap();
        let user_dir = tempfile::tempdir().unwrap();
        fs::write(user_dir.path().join("mine.asx"), "say 1\n").unwrap();

        let mut resolver = Resolver::new(user_dir.path()).with_std_dir(std_dir.path());
        let module = resolver.load_module("mine").unwrap();
        assert_eq!(module.program.statements.len(), 1);
    }

    #[test]
    fn test_not_found_lists_candidates() {
        let user_dir = tempfile::tempdir().unwrap();
        let resolver = Resolver::new(user_dir.path()).with_std_dir("/nonexistent/std");
        let Err(ResolveError::NotFound { name, searched }) =
            resolver.resolve_module_path("missing_module")
        else {
            panic!("Expected NotFound");
        };
        assert_eq!(name, "missing_module");
        assert_eq!(searched.len(), 2);
    }

    #[test]
    fn test_parse_error_is_wrapped() {
        let user_dir = tempfile::tempdir().unwrap();
        fs::write(user_dir.path().join("bad.asx"), "x = \"open\n").unwrap();

        let mut resolver = Resolver::new(user_dir.path());
        let err = resolver.load_module("bad").unwrap_err();
        assert!(matches!(err, ResolveError::Parse { .. }));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_cache_returns_same_program() {
        let user_dir = tempfile::tempdir().unwrap();
        fs::write(user_dir.path().join("m.asx"), "x = 1\n").unwrap();

        let mut resolver = Resolver::new(user_dir.path());
        let first = resolver.load_module("m").unwrap();
        let second = resolver.load_module("m").unwrap();
        assert!(Rc::ptr_eq(&first.program, &second.program));
    }
}
