use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::ValueAccessor;
use crate::value::to_number;

/// Name of the dynamic table holding the expense rows
pub const PROJECTS_KEY: &str = "projects";

pub const PROJECT_COLUMN: &str = "choose_project";
pub const CATEGORY_COLUMN: &str = "choose_category";
pub const AMOUNT_COLUMN: &str = "amount";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

/// One line of the expense table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub choose_project: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choose_category: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl ProjectRow {
    /// Lenient conversion from a raw row object
    ///
    /// Needs an integral `choose_project`; category is dropped when it is not
    /// an integer and amount goes through [`to_number`].
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let project = obj.get(PROJECT_COLUMN).and_then(Value::as_i64)?;
        let category = obj.get(CATEGORY_COLUMN).and_then(Value::as_i64);
        let amount = obj.get(AMOUNT_COLUMN).and_then(to_number);

        Some(ProjectRow {
            choose_project: ProjectId(project),
            choose_category: category.map(CategoryId),
            amount,
        })
    }
}

/// Fetch the row objects stored under `key`
///
/// A missing key or a non-array value gives an empty collection; `null`
/// entries and non-object entries are skipped one by one.
pub fn row_objects<'a>(accessor: &'a dyn ValueAccessor, key: &str) -> Vec<&'a Map<String, Value>> {
    let Some(Value::Array(items)) = accessor.get_value(key) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(obj) => Some(obj),
            Value::Null => None,
            other => {
                warn!("skipping non-object row in '{}': {}", key, other);
                None
            }
        })
        .collect()
}

/// Typed view of the rows stored under `key`, malformed rows skipped
pub fn project_rows(accessor: &dyn ValueAccessor, key: &str) -> Vec<ProjectRow> {
    let Some(Value::Array(items)) = accessor.get_value(key) else {
        return Vec::new();
    };
    items.iter().filter_map(ProjectRow::from_value).collect()
}
