use serde_json::Value;

/// Coerce a loosely-typed value into a finite number
///
/// Numbers pass through when finite. Strings are trimmed and parsed as a
/// decimal float, or as a `0x`/`0o`/`0b` prefixed integer. Anything else,
/// including empty strings and values that resolve to infinity or NaN,
/// yields `None`.
///
/// # Examples
/// ```
/// use expense_survey::value::to_number;
/// use serde_json::json;
///
/// assert_eq!(to_number(&json!(10)), Some(10.0));
/// assert_eq!(to_number(&json!("  5  ")), Some(5.0));
/// assert_eq!(to_number(&json!("abc")), None);
/// ```
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }
}

fn parse_numeric_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(v) = parse_radix_literal(trimmed) {
        return Some(v);
    }

    // f64's parser accepts "inf" and "nan" spellings, the finiteness check drops them
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_radix_literal(s: &str) -> Option<f64> {
    if s.len() < 3 || !s.starts_with('0') {
        return None;
    }
    let radix = match s.as_bytes()[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    // Accumulate as f64 so literals wider than u64 still coerce
    s[2..].chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

/// Strict equality between two values
///
/// Numbers compare numerically regardless of their JSON representation
/// (`1` equals `1.0`); every other pair must be the same type and value.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        _ => a == b,
    }
}

/// Truthiness used by `visibleIf` conditions
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether a value counts as "no answer"
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Turn an `f64` into a JSON number, keeping integral values integral
pub fn number_value(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Value::from(v as i64)
    } else {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
