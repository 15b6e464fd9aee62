use serde_json::Value;

/// Errors raised by survey operations
///
/// Expression functions never produce these; they are reserved for
/// misuse of the survey itself (bad definitions, bad edits, validation).
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    #[error("invalid survey definition: {0}")]
    Definition(#[from] serde_json::Error),

    #[error("failed to read survey definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("unknown question '{0}'")]
    UnknownQuestion(String),

    #[error("'{0}' is not a dynamic matrix")]
    NotAMatrix(String),

    #[error("matrix '{matrix}' has no column '{column}'")]
    UnknownColumn { matrix: String, column: String },

    #[error("row {index} is out of range for '{matrix}' ({len} rows)")]
    RowOutOfRange {
        matrix: String,
        index: usize,
        len: usize,
    },

    #[error("{value} is not a valid choice for column '{column}'")]
    InvalidChoice { column: String, value: Value },

    #[error("column '{column}' expects a number, got {value}")]
    NotANumber { column: String, value: Value },

    #[error("row {row}, column '{column}': {value} is below the minimum of {min}")]
    BelowMinimum {
        column: String,
        row: usize,
        value: f64,
        min: f64,
    },

    #[error("survey has already been completed")]
    AlreadyCompleted,
}
