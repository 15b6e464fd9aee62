use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::definition::{Element, SurveyDefinition};
use crate::error::SurveyError;
use crate::expression::Expression;
use crate::functions::{FunctionRegistry, SurveyFunction, default_registry};
use crate::row::{ProjectRow, project_rows};
use crate::store::{SurveyData, ValueAccessor};
use crate::value::{is_empty_value, is_truthy, number_value, strict_equals, to_number};

/// A question whose value and visibility come from expressions
#[derive(Clone, Debug)]
pub struct DerivedField {
    pub name: String,
    pub title: Option<String>,
    value_expression: Option<Expression>,
    visible_if: Option<Expression>,
    visible: bool,
}

impl DerivedField {
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Snapshot of a derived field for display
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FieldSummary {
    pub name: String,
    pub title: String,
    pub value: Value,
    pub visible: bool,
}

/// A running survey: definition, answers and derived fields
///
/// Every mutation of the answers re-evaluates all derived fields, so
/// values and visibility always reflect the current data.
pub struct Survey {
    definition: SurveyDefinition,
    data: SurveyData,
    fields: Vec<DerivedField>,
    functions: FunctionRegistry,
    completed: bool,
}

impl Survey {
    /// Build a survey using the process-wide function table
    pub fn new(definition: SurveyDefinition) -> Result<Self, SurveyError> {
        Self::with_functions(definition, default_registry())
    }

    pub fn with_functions(
        definition: SurveyDefinition,
        functions: FunctionRegistry,
    ) -> Result<Self, SurveyError> {
        let fields = compile_fields(&definition)?;

        let mut data = SurveyData::new();
        for element in definition.all_elements() {
            if let Element::MatrixDynamic(matrix) = element {
                if matrix.row_count > 0 {
                    let rows = vec![Value::Object(Map::new()); matrix.row_count];
                    data.set_value(&matrix.name, Value::Array(rows));
                }
            }
        }

        let mut survey = Survey {
            definition,
            data,
            fields,
            functions,
            completed: false,
        };
        survey.run_expressions();
        Ok(survey)
    }

    pub fn from_json(json: &str) -> Result<Self, SurveyError> {
        Self::new(SurveyDefinition::from_json(json)?)
    }

    /// The built-in expense form
    pub fn default_survey() -> Result<Self, SurveyError> {
        Self::new(SurveyDefinition::default())
    }

    pub fn definition(&self) -> &SurveyDefinition {
        &self.definition
    }

    pub fn data(&self) -> &SurveyData {
        &self.data
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Register a function for this survey only and re-evaluate
    pub fn register_function(&mut self, name: &str, func: SurveyFunction) {
        self.functions.register(name, func);
        self.run_expressions();
    }

    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.data.get_value(key)
    }

    /// Replace the value stored under `key`; `null` clears it
    pub fn set_value(&mut self, key: &str, value: Value) -> Result<(), SurveyError> {
        self.ensure_editable()?;
        if self.data.set_value(key, value) {
            self.run_expressions();
        }
        Ok(())
    }

    pub fn row_count(&self, matrix: &str) -> usize {
        match self.data.get_value(matrix) {
            Some(Value::Array(rows)) => rows.len(),
            _ => 0,
        }
    }

    /// Append an empty row and return its index
    pub fn add_row(&mut self, matrix: &str) -> Result<usize, SurveyError> {
        self.ensure_editable()?;
        self.definition.matrix(matrix)?;

        let rows = self.rows_mut(matrix);
        rows.push(Value::Object(Map::new()));
        let index = rows.len() - 1;

        self.run_expressions();
        Ok(index)
    }

    pub fn remove_row(&mut self, matrix: &str, index: usize) -> Result<(), SurveyError> {
        self.ensure_editable()?;
        self.definition.matrix(matrix)?;

        let len = self.row_count(matrix);
        if index >= len {
            return Err(SurveyError::RowOutOfRange {
                matrix: matrix.to_string(),
                index,
                len,
            });
        }
        let rows = self.rows_mut(matrix);
        rows.remove(index);
        if rows.is_empty() {
            self.data.remove(matrix);
        }

        self.run_expressions();
        Ok(())
    }

    /// Set one cell of a dynamic matrix
    ///
    /// Dropdown cells must hold one of the column's choices; numeric cells
    /// accept numbers or numeric strings and store the number. `null` (or an
    /// empty string) clears the cell.
    pub fn set_cell(
        &mut self,
        matrix: &str,
        index: usize,
        column: &str,
        value: Value,
    ) -> Result<(), SurveyError> {
        self.ensure_editable()?;

        let def = self.definition.matrix(matrix)?;
        let col = def.column(column).ok_or_else(|| SurveyError::UnknownColumn {
            matrix: matrix.to_string(),
            column: column.to_string(),
        })?;

        let cleared = is_empty_value(&value);
        let value = if cleared {
            Value::Null
        } else if col.is_dropdown() {
            col.choices
                .iter()
                .find(|choice| strict_equals(&choice.value, &value))
                .map(|choice| choice.value.clone())
                .ok_or_else(|| SurveyError::InvalidChoice {
                    column: column.to_string(),
                    value: value.clone(),
                })?
        } else if col.is_numeric() {
            to_number(&value)
                .map(number_value)
                .ok_or_else(|| SurveyError::NotANumber {
                    column: column.to_string(),
                    value: value.clone(),
                })?
        } else {
            value
        };

        let len = self.row_count(matrix);
        if index >= len {
            return Err(SurveyError::RowOutOfRange {
                matrix: matrix.to_string(),
                index,
                len,
            });
        }
        let row = &mut self.rows_mut(matrix)[index];
        if !row.is_object() {
            *row = Value::Object(Map::new());
        }
        if let Value::Object(cells) = row {
            if cleared {
                cells.remove(column);
            } else {
                cells.insert(column.to_string(), value);
            }
        }

        self.run_expressions();
        Ok(())
    }

    /// Typed view of a matrix's rows, malformed rows left out
    pub fn rows(&self, matrix: &str) -> Vec<ProjectRow> {
        project_rows(&self.data, matrix)
    }

    pub fn field(&self, name: &str) -> Option<&DerivedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the derived field `name` is currently shown
    pub fn is_visible(&self, name: &str) -> bool {
        self.field(name).is_some_and(DerivedField::is_visible)
    }

    pub fn field_value(&self, name: &str) -> Option<&Value> {
        self.data.get_value(name)
    }

    /// Every derived field with a title, in definition order
    pub fn summary_fields(&self) -> Vec<FieldSummary> {
        self.fields
            .iter()
            .filter_map(|field| {
                let title = field.title.clone()?;
                Some(FieldSummary {
                    name: field.name.clone(),
                    title,
                    value: self.data.get_value(&field.name).cloned().unwrap_or(Value::Null),
                    visible: field.visible,
                })
            })
            .collect()
    }

    /// Check every numeric matrix cell against its column minimum
    pub fn validate(&self) -> Vec<SurveyError> {
        let mut errors = Vec::new();
        for element in self.definition.all_elements() {
            let Element::MatrixDynamic(matrix) = element else {
                continue;
            };
            let Some(Value::Array(rows)) = self.data.get_value(&matrix.name) else {
                continue;
            };
            for (index, row) in rows.iter().enumerate() {
                let Some(cells) = row.as_object() else {
                    continue;
                };
                for col in &matrix.columns {
                    let (Some(min), Some(value)) =
                        (col.min, cells.get(&col.name).and_then(to_number))
                    else {
                        continue;
                    };
                    if value < min {
                        errors.push(SurveyError::BelowMinimum {
                            column: col.name.clone(),
                            row: index,
                            value,
                            min,
                        });
                    }
                }
            }
        }
        errors
    }

    /// Finish the survey and return the captured data as JSON
    ///
    /// Values of derived fields that are hidden at this point are dropped
    /// from the result.
    pub fn complete(&mut self) -> Result<String, SurveyError> {
        self.ensure_editable()?;
        if let Some(error) = self.validate().into_iter().next() {
            return Err(error);
        }

        for field in self.fields.iter().filter(|f| !f.visible) {
            self.data.remove(&field.name);
        }
        self.completed = true;

        let results = self.data.to_json().to_string();
        info!("survey completed: {}", results);
        Ok(results)
    }

    fn ensure_editable(&self) -> Result<(), SurveyError> {
        if self.completed {
            Err(SurveyError::AlreadyCompleted)
        } else {
            Ok(())
        }
    }

    fn rows_mut(&mut self, matrix: &str) -> &mut Vec<Value> {
        if !matches!(self.data.get_value(matrix), Some(Value::Array(_))) {
            self.data.set_value(matrix, Value::Array(Vec::new()));
        }
        match self.data.get_mut(matrix) {
            Some(Value::Array(rows)) => rows,
            _ => unreachable!("matrix value was just set to an array"),
        }
    }

    /// Re-evaluate visibility and value of every derived field
    fn run_expressions(&mut self) {
        for field in self.fields.iter_mut() {
            if let Some(condition) = &field.visible_if {
                field.visible = is_truthy(&condition.evaluate(&self.data, &self.functions));
            }
            if let Some(expression) = &field.value_expression {
                let value = expression.evaluate(&self.data, &self.functions);
                if is_empty_value(&value) {
                    self.data.remove(&field.name);
                } else {
                    self.data.set_value(&field.name, value);
                }
            }
        }
        debug!(
            "recalculated {} derived fields, visible: {:?}",
            self.fields.len(),
            self.fields
                .iter()
                .filter(|f| f.visible)
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
        );
    }
}

fn compile_fields(definition: &SurveyDefinition) -> Result<Vec<DerivedField>, SurveyError> {
    let parse = |source: &Option<String>| source.as_deref().map(Expression::parse).transpose();

    let mut fields = Vec::new();
    for element in definition.all_elements() {
        match element {
            Element::Text(text) => {
                if text.set_value_expression.is_none() && text.visible_if.is_none() {
                    continue;
                }
                fields.push(DerivedField {
                    name: text.name.clone(),
                    title: Some(text.title.clone().unwrap_or_else(|| text.name.clone())),
                    value_expression: parse(&text.set_value_expression)?,
                    visible_if: parse(&text.visible_if)?,
                    visible: true,
                });
            }
            Element::Expression(expr) => {
                let hidden_title = expr.title_location.as_deref() == Some("hidden");
                fields.push(DerivedField {
                    name: expr.name.clone(),
                    title: if hidden_title {
                        None
                    } else {
                        Some(expr.title.clone().unwrap_or_else(|| expr.name.clone()))
                    },
                    value_expression: Some(Expression::parse(&expr.expression)?),
                    visible_if: parse(&expr.visible_if)?,
                    visible: true,
                });
            }
            _ => {}
        }
    }
    Ok(fields)
}
