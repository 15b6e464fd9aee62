use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::definition::SurveyDefinition;
use crate::error::SurveyError;
use crate::row::PROJECTS_KEY;
use crate::survey::{FieldSummary, Survey};

pub struct AppState {
    definition: SurveyDefinition,
    survey: Mutex<Survey>,
}

impl AppState {
    pub fn new(definition: SurveyDefinition) -> Result<Self, SurveyError> {
        let survey = Survey::new(definition.clone())?;
        Ok(AppState {
            definition,
            survey: Mutex::new(survey),
        })
    }

    fn survey(&self) -> MutexGuard<'_, Survey> {
        match self.survey.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn default_matrix() -> String {
    PROJECTS_KEY.to_string()
}

#[derive(Deserialize)]
struct CellUpdate {
    #[serde(default = "default_matrix")]
    matrix: String,
    row: usize,
    column: String,
    #[serde(default)]
    value: Value,
}

#[derive(Serialize)]
struct SurveyResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    definition: Option<SurveyDefinition>,
    data: Value,
    rows: usize,
    totals: Vec<FieldSummary>,
    completed: bool,
}

#[derive(Serialize)]
struct CompleteResponse {
    status: String,
    results: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
}

fn survey_response(survey: &Survey, definition: Option<SurveyDefinition>) -> SurveyResponse {
    SurveyResponse {
        status: "ok".to_string(),
        definition,
        data: survey.data().to_json(),
        rows: survey.row_count(PROJECTS_KEY),
        totals: survey.summary_fields(),
        completed: survey.is_completed(),
    }
}

fn error_response(err: SurveyError) -> Response {
    warn!("request rejected: {}", err);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            status: "error".to_string(),
            message: err.to_string(),
        }),
    )
        .into_response()
}

/// Routes of the survey web application
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_form))
        .route("/api/survey", get(get_survey))
        .route("/api/rows", post(add_row))
        .route("/api/rows/:index", delete(remove_row))
        .route("/api/cell", post(update_cell))
        .route("/api/complete", post(complete_survey))
        .route("/api/reset", post(reset_survey))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let definition = config.load_definition()?;
    let app_state = Arc::new(AppState::new(definition)?);
    let app = router(app_state);

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on http://{}", config.bind_address());
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_form() -> Html<&'static str> {
    Html(include_str!("./static/survey.html"))
}

async fn get_survey(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let survey = state.survey();
    Json(survey_response(&survey, Some(state.definition.clone())))
}

async fn add_row(State(state): State<Arc<AppState>>) -> Response {
    let mut survey = state.survey();
    match survey.add_row(PROJECTS_KEY) {
        Ok(_) => Json(survey_response(&survey, None)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn remove_row(
    Path(index): Path<usize>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let mut survey = state.survey();
    match survey.remove_row(PROJECTS_KEY, index) {
        Ok(()) => Json(survey_response(&survey, None)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn update_cell(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CellUpdate>,
) -> Response {
    let mut survey = state.survey();
    match survey.set_cell(&payload.matrix, payload.row, &payload.column, payload.value) {
        Ok(()) => Json(survey_response(&survey, None)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn complete_survey(State(state): State<Arc<AppState>>) -> Response {
    let mut survey = state.survey();
    match survey.complete() {
        Ok(results) => Json(CompleteResponse {
            status: "ok".to_string(),
            results,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn reset_survey(State(state): State<Arc<AppState>>) -> Response {
    match Survey::new(state.definition.clone()) {
        Ok(fresh) => {
            let mut survey = state.survey();
            *survey = fresh;
            Json(survey_response(&survey, None)).into_response()
        }
        Err(e) => error_response(e),
    }
}
