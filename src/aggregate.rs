//! Per-project aggregation over the expense table.
//!
//! Both functions read a snapshot of the row collection through a
//! [`ValueAccessor`] and never fail: rows that cannot be interpreted are
//! simply left out.

use log::warn;
use serde_json::Value;

use crate::row::{AMOUNT_COLUMN, PROJECT_COLUMN, PROJECTS_KEY, row_objects};
use crate::store::ValueAccessor;
use crate::value::{number_value, strict_equals, to_number};

/// Sum of the amounts of every row belonging to `project`
///
/// Amounts that do not coerce to a finite number contribute nothing.
/// Returns `0.0` when no row matches. A sum past the f64 range saturates
/// at `f64::MAX` (or `f64::MIN`).
pub fn sum_by_project(accessor: &dyn ValueAccessor, project: &Value) -> f64 {
    let sum: f64 = row_objects(accessor, PROJECTS_KEY)
        .into_iter()
        .filter(|row| {
            row.get(PROJECT_COLUMN)
                .is_some_and(|p| strict_equals(p, project))
        })
        .filter_map(|row| row.get(AMOUNT_COLUMN).and_then(to_number))
        .sum();

    if sum.is_finite() {
        sum
    } else {
        warn!("sum for project {} overflowed, saturating", project);
        sum.clamp(f64::MIN, f64::MAX)
    }
}

/// Whether at least one row belongs to `project`
pub fn has_project(accessor: &dyn ValueAccessor, project: &Value) -> bool {
    row_objects(accessor, PROJECTS_KEY).into_iter().any(|row| {
        row.get(PROJECT_COLUMN)
            .is_some_and(|p| strict_equals(p, project))
    })
}

/// `sumByProject(projectId)` as registered with the evaluator
pub fn sum_by_project_fn(accessor: &dyn ValueAccessor, params: &[Value]) -> Value {
    let project = params.first().unwrap_or(&Value::Null);
    number_value(sum_by_project(accessor, project))
}

/// `hasProject(projectId)` as registered with the evaluator
pub fn has_project_fn(accessor: &dyn ValueAccessor, params: &[Value]) -> Value {
    let project = params.first().unwrap_or(&Value::Null);
    Value::Bool(has_project(accessor, project))
}
