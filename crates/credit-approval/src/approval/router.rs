use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::context::{ApprovalContext, ApprovalError, Assessment};
use super::domain::{ApplicantRecord, FormOptions, SummaryRow};
use super::model::ModelKind;

/// Router builder exposing the prediction endpoints.
pub fn approval_router(context: Arc<ApprovalContext>) -> Router {
    Router::new()
        .route("/api/v1/approval/predict", post(predict_handler))
        .route("/api/v1/approval/options", get(options_handler))
        .route("/api/v1/approval/schema", get(schema_handler))
        .with_state(context)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PredictQuery {
    #[serde(default)]
    pub(crate) model: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PredictionResponse {
    #[serde(flatten)]
    pub(crate) assessment: Assessment,
    pub(crate) applicant: Vec<SummaryRow>,
    pub(crate) evaluated_at: DateTime<Utc>,
}

pub(crate) async fn predict_handler(
    State(context): State<Arc<ApprovalContext>>,
    Query(query): Query<PredictQuery>,
    Json(record): Json<ApplicantRecord>,
) -> Response {
    let kind = match query.model.as_deref().map(str::parse::<ModelKind>) {
        None => context.default_model(),
        Some(Ok(kind)) => kind,
        Some(Err(err)) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match context.predict_with(&record, kind) {
        Ok(assessment) => {
            let body = PredictionResponse {
                assessment,
                applicant: record.summary(),
                evaluated_at: Utc::now(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(ApprovalError::Validation(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(ApprovalError::ModelUnavailable(kind)) => {
            let payload = json!({ "error": format!("{kind} model is not loaded") });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(ApprovalError::SchemaMismatch { .. } | ApprovalError::Inference(_)) => {
            let payload = json!({ "error": "prediction unavailable, please try again later" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn options_handler() -> Json<FormOptions> {
    Json(FormOptions::catalogue())
}

pub(crate) async fn schema_handler(
    State(context): State<Arc<ApprovalContext>>,
) -> Json<serde_json::Value> {
    Json(json!({
        "columns": context.schema().columns(),
        "default_model": context.default_model(),
        "unmapped_options": context.layout().unmapped_indicators(),
    }))
}
