//! `File` mixins
//!
//! Paths are taken as given, so relative paths resolve against the current
//! working directory.

use crate::ast::Value;
use crate::mixin::{Mixin, MixinError, MixinModule, Scope, Thrown, Variable, kinds};
use std::fs::{self, OpenOptions};
use std::io::Write;

pub struct FileModule;

impl MixinModule for FileModule {
    fn name(&self) -> &'static str {
        "File"
    }

    fn build(&self) -> Result<Vec<Mixin>, MixinError> {
        Ok(vec![
            Mixin::new("File", "read", &["filename"], read)?,
            Mixin::new("File", "write", &["data", "filename"], write)?,
            Mixin::new("File", "append", &["data", "filename"], append)?,
        ])
    }
}

fn read(scope: &mut Scope) -> Result<(), Thrown> {
    let filename = scope.string("filename")?;
    let contents = fs::read_to_string(filename)
        .map_err(|e| scope.throw(kinds::IO_ERROR, format!("cannot read {filename}: {e}")))?;
    scope.place(Variable::new("contents", Value::Str(contents)));
    Ok(())
}

fn write(scope: &mut Scope) -> Result<(), Thrown> {
    store(scope, false)
}

fn append(scope: &mut Scope) -> Result<(), Thrown> {
    store(scope, true)
}

/// Shared body of `write` and `append`; reports the byte count as `written`
fn store(scope: &mut Scope, append: bool) -> Result<(), Thrown> {
    let data = scope.string("data")?;
    let filename = scope.string("filename")?;

    let result = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(filename)
        .and_then(|mut file| file.write_all(data.as_bytes()));
    if let Err(e) = result {
        return Err(scope.throw(kinds::IO_ERROR, format!("cannot write {filename}: {e}")));
    }

    let written = data.len() as f64;
    scope.set("written", Value::Num(written));
    Ok(())
}
