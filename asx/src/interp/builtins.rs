//! Built-in statements: `say`/`out`, `pause`/`wait` and `delete`

use super::error::{InterpResult, RuntimeError};
use super::eval::Interpreter;
use super::value::Printed;
use crate::ast::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Built-in statement: receives the unresolved argument list
pub type BuiltinFn = fn(&mut Interpreter, &[Value]) -> InterpResult<()>;

/// Register built-in statements
pub(super) fn register_builtins(builtins: &mut HashMap<&'static str, BuiltinFn>) {
    builtins.insert("say", builtin_say);
    builtins.insert("out", builtin_say);
    builtins.insert("pause", builtin_pause);
    builtins.insert("wait", builtin_pause);
    builtins.insert("delete", builtin_delete);
}

/// Print the leading argument on its own line
fn builtin_say(interp: &mut Interpreter, args: &[Value]) -> InterpResult<()> {
    let line = match args.first() {
        Some(arg) => Printed(&interp.resolve(arg)?).to_string(),
        None => String::new(),
    };
    interp.emit(line);
    Ok(())
}

/// Block the thread for the given number of seconds
fn builtin_pause(interp: &mut Interpreter, args: &[Value]) -> InterpResult<()> {
    let arg = args
        .first()
        .ok_or_else(|| RuntimeError::type_mismatch("wait expects a number of seconds"))?;

    let seconds = match interp.resolve(arg)? {
        Value::Num(n) => n,
        other => return Err(RuntimeError::type_error("num", other.type_name())),
    };
    // rejects negative, NaN and out-of-range durations
    let duration = Duration::try_from_secs_f64(seconds).map_err(|_| {
        RuntimeError::type_mismatch(format!("cannot wait {seconds} seconds"))
    })?;

    tracing::trace!(seconds, "pausing");
    std::thread::sleep(duration);
    Ok(())
}

/// Remove bindings from the active tier
fn builtin_delete(interp: &mut Interpreter, args: &[Value]) -> InterpResult<()> {
    if args.is_empty() {
        return Err(RuntimeError::type_mismatch("delete expects a variable"));
    }

    for arg in args {
        let Value::Var(name) = arg else {
            return Err(RuntimeError::type_error("variable", arg.type_name()));
        };
        let frame = interp.frame.as_deref();
        interp
            .memory
            .remove(frame, name)
            .ok_or_else(|| RuntimeError::undefined_variable(name))?;
    }
    Ok(())
}
