use expense_survey::aggregate::{has_project, has_project_fn, sum_by_project, sum_by_project_fn};
use expense_survey::store::{EmptyAccessor, SurveyData};
use expense_survey::{PROJECTS_KEY, ValueAccessor};
use serde_json::{Value, json};

fn store_with(rows: Value) -> SurveyData {
    let mut data = SurveyData::new();
    data.set_value(PROJECTS_KEY, rows);
    data
}

fn sample() -> SurveyData {
    store_with(json!([
        { "choose_project": 1, "amount": 100 },
        { "choose_project": 1, "amount": 50 },
        { "choose_project": 2, "amount": 30 }
    ]))
}

#[test]
fn test_sum_by_project() {
    let data = sample();
    assert_eq!(sum_by_project(&data, &json!(1)), 150.0);
    assert_eq!(sum_by_project(&data, &json!(2)), 30.0);
    assert_eq!(sum_by_project(&data, &json!(3)), 0.0);
    println!("✓ Sums are 150 / 30 / 0 for projects 1 / 2 / 3");
}

#[test]
fn test_has_project() {
    let data = sample();
    assert!(has_project(&data, &json!(1)));
    assert!(has_project(&data, &json!(2)));
    assert!(!has_project(&data, &json!(3)));
    println!("✓ Presence follows the rows");

    let empty = store_with(json!([]));
    for id in 1..=3 {
        assert!(!has_project(&empty, &json!(id)));
        assert_eq!(sum_by_project(&empty, &json!(id)), 0.0);
    }
    println!("✓ Empty collection has no projects and zero sums");
}

#[test]
fn test_repeated_calls_are_stable() {
    let data = sample();
    let first = (sum_by_project(&data, &json!(1)), has_project(&data, &json!(2)));
    for _ in 0..5 {
        assert_eq!(
            (sum_by_project(&data, &json!(1)), has_project(&data, &json!(2))),
            first
        );
    }
    println!("✓ Unchanged snapshot gives identical results");
}

#[test]
fn test_malformed_amounts_are_skipped() {
    let data = store_with(json!([
        { "choose_project": 1, "amount": "25" },
        { "choose_project": 1, "amount": " 5 " },
        { "choose_project": 1, "amount": "abc" },
        { "choose_project": 1, "amount": "" },
        { "choose_project": 1, "amount": null },
        { "choose_project": 1 },
        { "choose_project": 2, "amount": true }
    ]));

    assert_eq!(sum_by_project(&data, &json!(1)), 30.0);
    assert_eq!(sum_by_project(&data, &json!(2)), 0.0);
    assert!(has_project(&data, &json!(2)));
    println!("✓ Rows whose amount fails coercion add nothing but still count as present");
}

#[test]
fn test_malformed_rows_are_skipped() {
    let data = store_with(json!([
        null,
        42,
        "row",
        [1, 2],
        { "choose_project": 3, "amount": 12 },
        { "choose_category": 1, "amount": 99 }
    ]));

    assert_eq!(sum_by_project(&data, &json!(3)), 12.0);
    assert!(has_project(&data, &json!(3)));
    assert!(!has_project(&data, &json!(1)));
    println!("✓ Null and non-object entries are ignored individually");
}

#[test]
fn test_project_ids_compare_strictly() {
    let data = store_with(json!([
        { "choose_project": "1", "amount": 10 },
        { "choose_project": 1.0, "amount": 5 }
    ]));

    assert_eq!(sum_by_project(&data, &json!(1)), 5.0);
    assert_eq!(sum_by_project(&data, &json!("1")), 10.0);
    println!("✓ A string id never matches a numeric id");
}

#[test]
fn test_missing_collection() {
    let data = SurveyData::new();
    assert_eq!(sum_by_project(&data, &json!(1)), 0.0);
    assert!(!has_project(&data, &json!(1)));

    let not_an_array = store_with(json!({ "choose_project": 1, "amount": 10 }));
    assert_eq!(sum_by_project(&not_an_array, &json!(1)), 0.0);
    assert!(!has_project(&not_an_array, &json!(1)));

    assert_eq!(sum_by_project(&EmptyAccessor, &json!(1)), 0.0);
    assert!(!has_project(&EmptyAccessor, &json!(1)));
    println!("✓ Missing or malformed collection behaves as empty");
}

#[test]
fn test_overflowing_sum_saturates() {
    let data = store_with(json!([
        { "choose_project": 1, "amount": 1e308 },
        { "choose_project": 1, "amount": 1e308 },
        { "choose_project": 2, "amount": -1e308 },
        { "choose_project": 2, "amount": -1e308 }
    ]));

    assert_eq!(sum_by_project(&data, &json!(1)), f64::MAX);
    assert_eq!(sum_by_project(&data, &json!(2)), f64::MIN);
    assert_eq!(sum_by_project_fn(&data, &[json!(1)]).as_f64(), Some(f64::MAX));
    println!("✓ Sums past the f64 range saturate instead of becoming null");
}

#[test]
fn test_registered_callbacks() {
    let data = sample();
    let accessor: &dyn ValueAccessor = &data;

    assert_eq!(sum_by_project_fn(accessor, &[json!(1)]), json!(150));
    assert_eq!(has_project_fn(accessor, &[json!(2)]), json!(true));
    assert_eq!(has_project_fn(accessor, &[json!(3)]), json!(false));
    println!("✓ Callbacks wrap the aggregation results as JSON values");

    assert_eq!(sum_by_project_fn(accessor, &[]), json!(0));
    assert_eq!(has_project_fn(accessor, &[]), json!(false));
    println!("✓ Missing argument matches nothing");

    let fractional = store_with(json!([
        { "choose_project": 1, "amount": 0.5 },
        { "choose_project": 1, "amount": "1.25" }
    ]));
    assert_eq!(sum_by_project_fn(&fractional, &[json!(1)]), json!(1.75));
    println!("✓ Fractional sums are preserved");
}
