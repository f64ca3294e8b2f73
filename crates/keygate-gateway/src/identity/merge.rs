//! Recursive configuration merge.

use serde_json::{Map, Value};

/// Merge `overlay` onto `base`, returning a new value. Nested objects merge
/// key by key; any other overlay value replaces the base value. Neither input
/// is modified.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(b), Value::Object(o)) => {
            let mut out: Map<String, Value> = b.clone();
            for (k, v) in o {
                let merged = match out.get(k) {
                    Some(existing) => deep_merge(existing, v),
                    None => v.clone(),
                };
                out.insert(k.clone(), merged);
            }
            Value::Object(out)
        }
        (_, Value::Null) => base.clone(),
        _ => overlay.clone(),
    }
}
