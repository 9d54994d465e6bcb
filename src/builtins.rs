// File: src/builtins.rs
//
// Native functions exposed to Ember programs. The standard library is a
// single function: clock().

use std::time::Instant;

use once_cell::sync::Lazy;

use crate::value::Value;
use crate::vm::Vm;

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Installs every native into the VM's globals. Called once at VM
/// construction.
pub fn register(vm: &mut Vm) {
    vm.define_native("clock", clock);
}

/// Seconds elapsed since the interpreter started, as a number.
pub fn clock(_args: &[Value]) -> Value {
    Value::Number(START_TIME.elapsed().as_secs_f64())
}
