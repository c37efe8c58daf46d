use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::answers::{AnswerSet, Responses};
use super::record::{EvaluationId, EvaluationMetadata};
use super::repository::{EvaluationStore, StoreError};
use super::scoring::ScoringError;
use super::service::{EvaluationService, EvaluationServiceError};

#[derive(Debug, Deserialize)]
pub struct ResponsesPayload {
    #[serde(default)]
    pub responses: Responses,
}

#[derive(Debug, Deserialize)]
pub struct CreateEvaluationRequest {
    pub metadata: EvaluationMetadata,
    #[serde(default)]
    pub responses: Responses,
}

/// Router builder exposing the catalog, validation, scoring, and record endpoints.
pub fn evaluation_router<S>(service: Arc<EvaluationService<S>>) -> Router
where
    S: EvaluationStore + 'static,
{
    Router::new()
        .route("/api/v1/catalog", get(catalog_handler::<S>))
        .route(
            "/api/v1/evaluations",
            post(create_handler::<S>).get(list_handler::<S>),
        )
        .route("/api/v1/evaluations/validate", post(validate_handler::<S>))
        .route("/api/v1/evaluations/preview", post(preview_handler::<S>))
        .route(
            "/api/v1/evaluations/:evaluation_id",
            get(fetch_handler::<S>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/responses",
            put(amend_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn catalog_handler<S>(State(service): State<Arc<EvaluationService<S>>>) -> Response
where
    S: EvaluationStore + 'static,
{
    (StatusCode::OK, axum::Json(service.catalog())).into_response()
}

pub(crate) async fn validate_handler<S>(
    State(service): State<Arc<EvaluationService<S>>>,
    axum::Json(payload): axum::Json<ResponsesPayload>,
) -> Response
where
    S: EvaluationStore + 'static,
{
    let answers = AnswerSet::from_responses(service.catalog(), &payload.responses);
    let result = service.validate(&answers);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn preview_handler<S>(
    State(service): State<Arc<EvaluationService<S>>>,
    axum::Json(payload): axum::Json<ResponsesPayload>,
) -> Response
where
    S: EvaluationStore + 'static,
{
    let answers = AnswerSet::from_responses(service.catalog(), &payload.responses);
    match service.preview(&answers) {
        Ok(scores) => (StatusCode::OK, axum::Json(scores)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<EvaluationService<S>>>,
    axum::Json(request): axum::Json<CreateEvaluationRequest>,
) -> Response
where
    S: EvaluationStore + 'static,
{
    let answers = AnswerSet::from_responses(service.catalog(), &request.responses);
    match service.create(request.metadata, answers) {
        Ok(record) => {
            let document = record.to_document(service.catalog());
            (StatusCode::CREATED, axum::Json(document)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<S>(State(service): State<Arc<EvaluationService<S>>>) -> Response
where
    S: EvaluationStore + 'static,
{
    match service.list() {
        Ok(summaries) => (StatusCode::OK, axum::Json(summaries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<S>(
    State(service): State<Arc<EvaluationService<S>>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    S: EvaluationStore + 'static,
{
    let Ok(id) = EvaluationId::parse(&evaluation_id) else {
        return invalid_id(&evaluation_id);
    };
    match service.get(&id) {
        Ok(record) => {
            let document = record.to_document(service.catalog());
            (StatusCode::OK, axum::Json(document)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn amend_handler<S>(
    State(service): State<Arc<EvaluationService<S>>>,
    Path(evaluation_id): Path<String>,
    axum::Json(payload): axum::Json<ResponsesPayload>,
) -> Response
where
    S: EvaluationStore + 'static,
{
    let Ok(id) = EvaluationId::parse(&evaluation_id) else {
        return invalid_id(&evaluation_id);
    };
    match service.amend(&id, &payload.responses) {
        Ok(record) => {
            let document = record.to_document(service.catalog());
            (StatusCode::OK, axum::Json(document)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn invalid_id(raw: &str) -> Response {
    let payload = json!({
        "error": format!("'{raw}' is not a valid evaluation id"),
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn error_response(error: EvaluationServiceError) -> Response {
    match error {
        EvaluationServiceError::Validation(result)
        | EvaluationServiceError::Scoring(ScoringError::IncompleteEvaluation(result)) => {
            let payload = json!({
                "error": "evaluation has validation violations",
                "violations": result.violations(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        EvaluationServiceError::Metadata(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        EvaluationServiceError::Scoring(error @ ScoringError::NonFinite { .. }) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        EvaluationServiceError::Store(StoreError::NotFound) => {
            let payload = json!({
                "error": "evaluation not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        EvaluationServiceError::Store(StoreError::Conflict) => {
            let payload = json!({
                "error": "evaluation already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
