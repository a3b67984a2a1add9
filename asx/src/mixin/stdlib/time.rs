//! `Time` mixins

use crate::ast::Value;
use crate::mixin::{Mixin, MixinError, MixinModule, Scope, Thrown};
use chrono::Local;

pub struct TimeModule;

impl MixinModule for TimeModule {
    fn name(&self) -> &'static str {
        "Time"
    }

    fn build(&self) -> Result<Vec<Mixin>, MixinError> {
        Ok(vec![Mixin::new("Time", "time", &[], time)?])
    }
}

/// Local wall-clock time as `HH:MM:SS`
fn time(scope: &mut Scope) -> Result<(), Thrown> {
    let now = Local::now().format("%H:%M:%S").to_string();
    scope.set("current_time", Value::Str(now));
    Ok(())
}
