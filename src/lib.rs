/*!
# Expense Survey

A browser-based expense form that collects per-project expense rows and
shows live per-project totals, built in Rust.

## Overview

Users fill a dynamic table of rows (project, category, amount). Below the
table a panel shows one total per project. Each total is only visible once
at least one row references its project, and its value is recomputed on
every edit.

## Architecture

### Survey engine
- **Definition**: serde model of the form (pages, dynamic matrix, panels,
  text and expression questions), shipped as embedded JSON
- **Data store**: the answers, keyed by question name
- **Expression evaluator**: parses `setValueExpression` / `visibleIf`
  strings and calls named functions from a function registry
- **Recalculation**: every mutation re-evaluates all derived fields

### Aggregation functions
- `sumByProject(id)`: sum of the coerced amounts of the rows for `id`
- `hasProject(id)`: whether any row references `id`

Both read the row collection through the [`store::ValueAccessor`] trait
and never fail; malformed rows are skipped.

### Front-ends
- **Web** (feature `web`): axum server with a JSON API and a static page
- **CLI**: interactive prompt over the same engine

## Modules

- **value**: numeric coercion and value helpers
- **store**: data store and accessor trait
- **row**: typed expense rows and row collection access
- **aggregate**: per-project aggregation functions
- **functions**: expression function registry
- **expression**: expression parser and evaluator
- **definition**: survey definition model
- **survey**: survey runtime (editing, recalculation, completion)
- **config**: runtime configuration
- **app**: HTTP routing (feature `web`)

## REST API Endpoints

- `GET /api/survey` - Definition, answers and derived fields
- `POST /api/rows` - Adds a row to the expense table
- `DELETE /api/rows/{index}` - Removes a row
- `POST /api/cell` - Sets one cell
- `POST /api/complete` - Completes the survey and returns the data
- `POST /api/reset` - Starts over with a fresh survey
*/

pub mod aggregate;
pub mod config;
pub mod definition;
pub mod error;
pub mod expression;
pub mod functions;
pub mod row;
pub mod store;
pub mod survey;
pub mod value;

#[cfg(feature = "web")]
pub mod app;

pub use aggregate::{has_project, sum_by_project};
pub use config::AppConfig;
pub use definition::SurveyDefinition;
pub use error::SurveyError;
pub use functions::{FunctionRegistry, SurveyFunction};
pub use row::{CategoryId, PROJECTS_KEY, ProjectId, ProjectRow};
pub use store::{SurveyData, ValueAccessor};
pub use survey::{FieldSummary, Survey};
pub use value::to_number;
