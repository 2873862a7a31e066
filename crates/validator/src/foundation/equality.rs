//! Tolerant structural equality for JSON values

use serde_json::Value;

/// Compares two values structurally, ignoring `_key` on objects.
///
/// Array items carry per-item `_key`s that differ between otherwise identical
/// entries, so `valid` and `unique` must not look at them. Numbers are
/// compared by value, so `1` equals `1.0`.
#[must_use]
pub fn deep_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equals(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            let significant = |(key, _): &(&String, &Value)| key.as_str() != "_key";
            let left = xs.iter().filter(significant).count();
            let right = ys.iter().filter(significant).count();
            left == right
                && xs
                    .iter()
                    .filter(significant)
                    .all(|(key, x)| ys.get(key).is_some_and(|y| deep_equals(x, y)))
        }
        _ => a == b,
    }
}
