//! HTTP handlers for the prediction API

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use super::dashboard::{DASHBOARD_HTML, INDEX_HTML};
use super::AppState;
use crate::errors::PredictorError;
use crate::export::{download_file_name, to_csv_string, ExportRecord};
use crate::pipeline::{category_rows, range_rows, RawInputs};
use crate::types::{CompositionSample, PredictionResult};

/// JSON error body: `{error, kind, variable?, value?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    /// Offending raw value for `invalid_number`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn bad_body(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: rejection.body_text(),
                kind: "invalid_body".to_string(),
                variable: None,
                value: None,
            },
        }
    }
}

impl From<PredictorError> for ApiError {
    fn from(err: PredictorError) -> Self {
        let status = match &err {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            PredictorError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            body: ErrorBody {
                error: err.to_string(),
                kind: err.kind().to_string(),
                variable: err.variable().map(str::to_string),
                value: match &err {
                    PredictorError::InvalidNumber { value, .. } => Some(value.clone()),
                    PredictorError::DuplicateVariable { keys, .. } => Some(keys.join(", ")),
                    _ => None,
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Run the pipeline and record telemetry
fn run_prediction(
    state: &AppState,
    body: Result<Json<RawInputs>, JsonRejection>,
) -> Result<PredictionResult, ApiError> {
    let Json(raw) = body.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected request body");
        ApiError::bad_body(rejection)
    })?;

    let started = Instant::now();
    match state.pipeline.predict(&raw) {
        Ok(result) => {
            state.telemetry.served(
                result.classification.category,
                result.predicted_value,
                !result.within_training_range(),
                started.elapsed(),
            );
            info!(
                id = %result.id,
                predicted = result.predicted_value,
                category = %result.classification.category,
                "prediction served"
            );
            Ok(result)
        }
        Err(e) => {
            state.telemetry.error(&e);
            warn!(kind = e.kind(), error = %e, "prediction rejected");
            Err(e.into())
        }
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub algorithm: String,
    pub uptime_seconds: u64,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let info = state.pipeline.model().info();
    Json(HealthResponse {
        status: "ok".to_string(),
        model: info.name.clone(),
        algorithm: info.algorithm.clone(),
        uptime_seconds: state.telemetry.elapsed().as_secs(),
    })
}

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<RawInputs>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    run_prediction(&state, body).map(Json)
}

/// Same as `/predict`, answered as a one-row CSV download
pub async fn export(
    State(state): State<AppState>,
    body: Result<Json<RawInputs>, JsonRejection>,
) -> Result<Response, ApiError> {
    let result = run_prediction(&state, body)?;
    let csv = to_csv_string(&[ExportRecord::from_result(&result)])?;
    state.telemetry.exported(1);

    let disposition = format!("attachment; filename=\"{}\"", download_file_name());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

pub async fn model_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.pipeline.model().info().clone())
}

pub async fn ranges(State(state): State<AppState>) -> impl IntoResponse {
    Json(range_rows(&state.pipeline.policy().ranges))
}

pub async fn categories() -> impl IntoResponse {
    Json(category_rows())
}

#[derive(Debug, Serialize)]
pub struct ExampleResponse {
    pub sample: CompositionSample,
    pub ox: f64,
    pub component_sum: f64,
}

pub async fn example() -> Json<ExampleResponse> {
    let sample = CompositionSample::example();
    Json(ExampleResponse {
        sample,
        ox: sample.ox(),
        component_sum: sample.component_sum(),
    })
}

pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.telemetry.get_stats())
}
