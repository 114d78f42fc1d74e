// ============================================================================
// subject-store - Equality Functions
// The comparisons behind the change-detection gate
// ============================================================================

use serde_json::{Number, Value};

// =============================================================================
// STRICT EQUALITY (Default)
// =============================================================================

/// Default structural equality using PartialEq.
/// This is the default for `Store::new`.
///
/// `#[derive(PartialEq)]` already compares deeply: sequences element by
/// element in order, maps by key set and values.
///
/// # Example
/// ```
/// use subject_store::reactivity::equality::equals;
///
/// assert!(equals(&vec![1, 2], &vec![1, 2]));
/// assert!(!equals(&vec![1, 2], &vec![2, 1]));
/// ```
pub fn equals<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

/// Never equal - every `next` emits, even for an identical value.
pub fn never_equals<T>(_a: &T, _b: &T) -> bool {
    false
}

// =============================================================================
// FLOATS
// =============================================================================

/// Equality for f64 where NaN equals NaN.
///
/// A store of floats would otherwise emit on every `next(NaN)`.
///
/// # Example
/// ```
/// use subject_store::reactivity::equality::safe_equals_f64;
///
/// assert!(safe_equals_f64(&f64::NAN, &f64::NAN));
/// assert!(!safe_equals_f64(&f64::NAN, &1.0));
/// assert!(safe_equals_f64(&-0.0, &0.0));
/// ```
pub fn safe_equals_f64(a: &f64, b: &f64) -> bool {
    if a.is_nan() {
        return b.is_nan();
    }
    a == b
}

// =============================================================================
// JSON EQUALITY
// =============================================================================

/// Deep equality for JSON values that compares numbers by value.
///
/// `serde_json` keeps `1` and `1.0` as different numbers, and `Value`'s own
/// `PartialEq` reports them unequal. Values arriving through a path setter or
/// a typed round trip can switch representation without changing, so watched
/// and JSON stores compare numerically.
///
/// # Example
/// ```
/// use serde_json::json;
/// use subject_store::reactivity::equality::json_equals;
///
/// assert!(json_equals(&json!({"a": [1, 2]}), &json!({"a": [1.0, 2]})));
/// assert!(!json_equals(&json!([1, 2]), &json!([2, 1])));
/// assert!(!json_equals(&json!({"a": 1}), &json!({"a": 1, "b": null})));
/// ```
pub fn json_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => number_equals(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equals(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(key, x)| ym.get(key).is_some_and(|y| json_equals(x, y)))
        }
        _ => a == b,
    }
}

fn number_equals(x: &Number, y: &Number) -> bool {
    if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
        return x == y;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(x), Some(y)) => safe_equals_f64(&x, &y),
        _ => false,
    }
}

// =============================================================================
// TESTS
// =============================================================================
