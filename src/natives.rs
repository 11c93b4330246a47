//! Functions the host binds into the global frame before a program runs.

use chrono::Utc;
use log::debug;

use crate::value::{NativeFunction, Value};

/// Every native the interpreter installs by default.
pub fn defaults() -> Vec<NativeFunction> {
    vec![NativeFunction {
        name: "clock".to_string(),
        arity: 0,
        func: clock,
    }]
}

/// Seconds since the Unix epoch, with millisecond resolution.
fn clock(_args: &[Value]) -> Result<Value, String> {
    let millis = Utc::now().timestamp_millis();

    debug!("clock() = {}ms", millis);

    Ok(Value::Number(millis as f64 / 1000.0))
}
