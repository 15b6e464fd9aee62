use expense_survey::value::to_number;
use serde_json::{Value, json};

#[test]
fn test_to_number_numbers() {
    assert_eq!(to_number(&json!(10)), Some(10.0));
    assert_eq!(to_number(&json!(-2.5)), Some(-2.5));
    assert_eq!(to_number(&json!(0)), Some(0.0));
    println!("✓ Finite numbers pass through unchanged");

    // serde_json turns NaN into null
    assert_eq!(to_number(&Value::from(f64::NAN)), None);
    assert_eq!(to_number(&Value::from(f64::INFINITY)), None);
    println!("✓ NaN and infinity are absent");
}

#[test]
fn test_to_number_strings() {
    assert_eq!(to_number(&json!("42")), Some(42.0));
    assert_eq!(to_number(&json!("  5  ")), Some(5.0));
    assert_eq!(to_number(&json!("3.75")), Some(3.75));
    assert_eq!(to_number(&json!("1e3")), Some(1000.0));
    assert_eq!(to_number(&json!("-7")), Some(-7.0));
    println!("✓ Numeric strings are trimmed and parsed");

    assert_eq!(to_number(&json!("")), None);
    assert_eq!(to_number(&json!("   ")), None);
    assert_eq!(to_number(&json!("abc")), None);
    assert_eq!(to_number(&json!("12abc")), None);
    assert_eq!(to_number(&json!("Infinity")), None);
    println!("✓ Empty, blank and non-numeric strings are absent");
}

#[test]
fn test_to_number_other_types() {
    assert_eq!(to_number(&Value::Null), None);
    assert_eq!(to_number(&json!(true)), None);
    assert_eq!(to_number(&json!([1])), None);
    assert_eq!(to_number(&json!({ "amount": 1 })), None);
    println!("✓ Null, booleans, arrays and objects are absent");
}
