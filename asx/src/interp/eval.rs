//! Tree-walking statement executor

use super::arith;
use super::builtins::{BuiltinFn, register_builtins};
use super::error::{ErrorKind, InterpResult, RuntimeError};
use super::memory::{Function, Memory};
use crate::ast::{ArithToken, Block, ConditionalKind, Program, Statement, Value};
use crate::config::Config;
use crate::mixin::{Mixin, MixinError, MixinRegistry, Scope, stdlib};
use crate::normalize::Normalizer;
use crate::resolver::{ResolveError, Resolver};
use std::collections::HashMap;
use std::path::PathBuf;

/// Stack growth parameters for user function calls
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Where `say` output and reported errors go
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Lines to stdout, reported errors to stderr
    Stdout,
    /// Lines kept in memory
    Capture(Vec<String>),
}

/// Interpreter state for one run
pub struct Interpreter {
    pub(super) memory: Memory,
    mixins: MixinRegistry,
    resolver: Resolver,
    builtins: HashMap<&'static str, BuiltinFn>,
    /// Function whose locals are the active tier; `None` at top level
    pub(super) frame: Option<String>,
    ignore_errors: bool,
    /// Nesting depth of `try` blocks being executed
    try_depth: usize,
    output: Output,
    reported: Vec<RuntimeError>,
    /// Modules currently being imported
    importing: Vec<PathBuf>,
}

impl Interpreter {
    /// Create an interpreter with the given mixins, importing from the
    /// working directory
    pub fn new(mixins: MixinRegistry) -> Self {
        let mut builtins = HashMap::new();
        register_builtins(&mut builtins);

        Self {
            memory: Memory::new(),
            mixins,
            resolver: Resolver::new("."),
            builtins,
            frame: None,
            ignore_errors: false,
            try_depth: 0,
            output: Output::Stdout,
            reported: Vec::new(),
            importing: Vec::new(),
        }
    }

    /// Build an interpreter from configuration, loading the standard mixins
    pub fn from_config(config: &Config) -> Result<Self, MixinError> {
        let mut mixins = MixinRegistry::new();
        mixins.load(&stdlib::modules(), &config.mixins.disabled)?;

        let user_dir = config.user_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let mut resolver = Resolver::new(user_dir)
            .with_normalizer(Normalizer::new(config.default_tab_unit));
        if let Some(std_dir) = &config.std_dir {
            resolver = resolver.with_std_dir(std_dir);
        }

        Ok(Self::new(mixins)
            .with_resolver(resolver)
            .with_ignore_errors(config.ignore_errors))
    }

    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    /// Keep `say` output in memory instead of printing it
    pub fn capture_output(mut self) -> Self {
        self.output = Output::Capture(Vec::new());
        self
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Captured output lines (empty when printing to stdout)
    pub fn captured(&self) -> &[String] {
        match &self.output {
            Output::Capture(lines) => lines,
            Output::Stdout => &[],
        }
    }

    /// Errors reported and skipped by ignore-errors mode or `try`
    pub fn reported_errors(&self) -> &[RuntimeError] {
        &self.reported
    }

    /// Run a program
    pub fn run(&mut self, program: &Program) -> InterpResult<()> {
        self.exec_block(&program.statements)
    }

    pub(super) fn emit(&mut self, line: String) {
        match &mut self.output {
            Output::Stdout => println!("{line}"),
            Output::Capture(lines) => lines.push(line),
        }
    }

    fn report(&mut self, err: RuntimeError) {
        tracing::debug!(%err, "runtime error reported");
        if self.output == Output::Stdout {
            eprintln!("[ERROR] | {err}");
        }
        self.reported.push(err);
    }

    fn exec_block(&mut self, block: &Block) -> InterpResult<()> {
        // Some(taken) while inside an if/elif/else chain
        let mut chain: Option<bool> = None;

        for stmt in block {
            let result = self
                .exec_stmt(&stmt.node, &mut chain)
                .map_err(|e| e.at(stmt.line()));

            if let Err(err) = result {
                if self.ignore_errors && self.try_depth == 0 {
                    chain = None;
                    self.report(err);
                } else {
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Statement, chain: &mut Option<bool>) -> InterpResult<()> {
        if !matches!(stmt, Statement::Conditional { .. }) {
            *chain = None;
        }

        match stmt {
            Statement::Assignment { var, value } => {
                let value = self.resolve(value)?;
                self.memory.assign(self.frame.as_deref(), var.as_str(), value);
                Ok(())
            }

            Statement::Builtin { name, args } => {
                let builtin = self
                    .builtins
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| RuntimeError::undefined_function(name))?;
                builtin(self, args)
            }

            Statement::Call { name, args } => self.call_function(name, args),

            Statement::FunctionDef {
                name,
                parameters,
                body,
            } => {
                let replaced = self.memory.define_function(
                    name,
                    Function {
                        parameters: parameters.clone(),
                        body: body.clone(),
                    },
                );
                tracing::debug!(function = %name, replaced, "function registered");
                Ok(())
            }

            Statement::Import { module } => self.import(module),

            Statement::Mixin { name } => self.exec_mixin(name),

            Statement::Conditional {
                kind,
                condition,
                body,
            } => self.exec_conditional(*kind, condition.as_deref(), body, chain),
        }
    }

    fn exec_conditional(
        &mut self,
        kind: ConditionalKind,
        condition: Option<&[ArithToken]>,
        body: &Block,
        chain: &mut Option<bool>,
    ) -> InterpResult<()> {
        match kind {
            ConditionalKind::If => {
                *chain = None;
                let taken = self.branch(condition, body)?;
                *chain = Some(taken);
            }
            ConditionalKind::Elif => {
                if *chain == Some(true) {
                    return Ok(());
                }
                *chain = None;
                let taken = self.branch(condition, body)?;
                *chain = Some(taken);
            }
            ConditionalKind::Else => {
                let skip = *chain == Some(true);
                *chain = None;
                if !skip {
                    self.exec_block(body)?;
                }
            }
            ConditionalKind::While => {
                *chain = None;
                while self.test(condition)? {
                    self.exec_block(body)?;
                }
            }
            ConditionalKind::Try => {
                *chain = None;
                self.try_depth += 1;
                let result = self.exec_block(body);
                self.try_depth -= 1;
                if let Err(err) = result {
                    self.report(err);
                }
            }
        }
        Ok(())
    }

    /// Run `body` if `condition` holds; returns whether it ran
    fn branch(&mut self, condition: Option<&[ArithToken]>, body: &Block) -> InterpResult<bool> {
        let taken = self.test(condition)?;
        if taken {
            self.exec_block(body)?;
        }
        Ok(taken)
    }

    /// Evaluate a condition; an absent condition always holds
    fn test(&self, condition: Option<&[ArithToken]>) -> InterpResult<bool> {
        match condition {
            Some(tokens) => Ok(arith::evaluate(tokens, |name| self.lookup(name))?.is_truthy()),
            None => Ok(true),
        }
    }

    fn call_function(&mut self, name: &str, args: &[Value]) -> InterpResult<()> {
        let function = self
            .memory
            .function(name)
            .ok_or_else(|| RuntimeError::undefined_function(name))?;

        let values = args
            .iter()
            .map(|arg| self.resolve(arg))
            .collect::<InterpResult<Vec<_>>>()?;

        if values.len() != function.parameters.len() {
            tracing::debug!(
                function = name,
                expected = function.parameters.len(),
                got = values.len(),
                "partial argument binding"
            );
        }
        self.memory.bind_arguments(name, &function.parameters, values);

        let caller = self.frame.replace(name.to_string());
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.exec_block(&function.body)
        });
        self.frame = caller;
        result
    }

    fn import(&mut self, name: &str) -> InterpResult<()> {
        let module = self.resolver.load_module(name).map_err(import_error)?;

        if self.importing.contains(&module.path) {
            return Err(RuntimeError::circular_import(name));
        }

        tracing::debug!(module = name, path = %module.path.display(), "importing");
        self.importing.push(module.path.clone());
        let result = self.exec_block(&module.program.statements);
        self.importing.pop();
        result
    }

    /// `@mixin Lib.name`: run the native over the visible bindings and merge
    /// back whatever it added or changed
    fn exec_mixin(&mut self, name: &str) -> InterpResult<()> {
        let mixin = self
            .mixins
            .get(name)
            .ok_or_else(|| RuntimeError::undefined_mixin(name))?;

        let visible = self.memory.visible(self.frame.as_deref());
        let mut scope = Scope::new(visible.clone());
        self.invoke(mixin, &mut scope)?;

        for (var, formatted) in scope.format_changed(&visible) {
            let value = formatted
                .and_then(|formatted| formatted.to_value())
                .ok_or_else(|| {
                    RuntimeError::type_mismatch(format!(
                        "mixin `{name}` returned malformed `{var}`"
                    ))
                })?;
            self.memory.assign(self.frame.as_deref(), var, value);
        }
        Ok(())
    }

    fn invoke(&self, mixin: &Mixin, scope: &mut Scope) -> InterpResult<()> {
        tracing::trace!(mixin = %mixin.name, "invoking mixin");
        mixin
            .invoke(scope)
            .map_err(|thrown| RuntimeError::new(ErrorKind::from_thrown(&thrown.kind), thrown.message))
    }

    fn lookup(&self, name: &str) -> InterpResult<Value> {
        self.memory
            .lookup(self.frame.as_deref(), name)
            .cloned()
            .ok_or_else(|| RuntimeError::undefined_variable(name))
    }

    /// Resolve a value to one that can be stored
    pub(super) fn resolve(&self, value: &Value) -> InterpResult<Value> {
        match value {
            Value::Num(_) | Value::Str(_) | Value::Bool(_) => Ok(value.clone()),

            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve(item))
                .collect::<InterpResult<Vec<_>>>()
                .map(Value::Array),

            Value::Var(name) => self.lookup(name),

            Value::Element { base, index } => match self.lookup(base)? {
                Value::Array(items) => usize::try_from(*index)
                    .ok()
                    .and_then(|i| items.get(i).cloned())
                    .ok_or_else(|| RuntimeError::index_error(base, *index, items.len())),
                other => Err(RuntimeError::type_error("arr", other.type_name())),
            },

            Value::Call {
                module,
                name,
                params,
            } => {
                let qualified = match module {
                    Some(module) => format!("{module}.{name}"),
                    None => name.clone(),
                };
                let mixin = self
                    .mixins
                    .get(&qualified)
                    .ok_or_else(|| RuntimeError::undefined_mixin(&qualified))?;

                let mut bindings = self.memory.visible(self.frame.as_deref());
                for (param, arg) in mixin.params.iter().zip(params) {
                    bindings.insert(param.clone(), self.resolve(arg)?);
                }

                let mut scope = Scope::new(bindings);
                self.invoke(mixin, &mut scope)?;
                scope.last_written().cloned().ok_or_else(|| {
                    RuntimeError::type_mismatch(format!("mixin `{qualified}` returned no value"))
                })
            }

            Value::Arithmetic(tokens) => arith::evaluate(tokens, |name| self.lookup(name)),
        }
    }
}

/// Turn a resolver failure into an error of the `import` statement
fn import_error(err: ResolveError) -> RuntimeError {
    match err {
        ResolveError::NotFound { name, searched } => {
            RuntimeError::module_not_found(&name, &searched)
        }
        err @ ResolveError::Io { .. } => RuntimeError::io_error(err.to_string()),
        ResolveError::Parse { name, source } => {
            let location = source
                .line()
                .map(|line| format!(" line {line}"))
                .unwrap_or_default();
            let kind = RuntimeError::from(source.clone()).kind;
            RuntimeError::new(
                kind,
                format!("in module `{name}`{location}: {}", source.message()),
            )
        }
    }
}
