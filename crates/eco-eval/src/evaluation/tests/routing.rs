use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::evaluation::router::{create_handler, evaluation_router, CreateEvaluationRequest};
use crate::evaluation::service::EvaluationService;

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn complete_responses() -> Value {
    let responses = complete_answers().to_responses(&standard_catalog());
    serde_json::to_value(responses).expect("responses serialize")
}

fn router() -> axum::Router {
    evaluation_router(Arc::new(service_with(MemoryStore::default())))
}

#[tokio::test]
async fn catalog_endpoint_lists_categories() {
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/catalog")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    let categories = body["categories"].as_array().expect("categories array");
    assert_eq!(categories.len(), 5);
    assert_eq!(categories[0]["id"], json!("direct_environmental"));
}

#[tokio::test]
async fn validate_endpoint_reports_violations() {
    let mut responses = complete_responses();
    responses["indirect_environmental"]["life_cycle"]["circularity"] = json!(12);

    let response = router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/evaluations/validate",
            json!({ "responses": responses }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["violations"][0]["question_id"], json!("circularity"));
    assert_eq!(body["violations"][0]["kind"], json!("out_of_range"));
    assert_eq!(body["completion"]["overall"].as_f64().map(|v| v > 0.0), Some(true));
}

#[tokio::test]
async fn preview_endpoint_returns_scores() {
    let response = router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/evaluations/preview",
            json!({ "responses": complete_responses() }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    assert!(body["overall_score"].as_f64().is_some());
    assert!(body["category_scores"]["eco_social"].as_f64().is_some());
}

#[tokio::test]
async fn preview_of_empty_responses_is_unprocessable() {
    let response = router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/evaluations/preview",
            json!({ "responses": {} }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = read_json_body(response).await;
    assert_eq!(body["violations"].as_array().map(Vec::len), Some(31));
}

#[tokio::test]
async fn created_evaluation_can_be_fetched() {
    let app = router();
    let metadata = serde_json::to_value(metadata()).expect("metadata serializes");

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/evaluations",
            json!({ "metadata": metadata, "responses": complete_responses() }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json_body(response).await;
    let id = created["evaluation_id"].as_str().expect("id string").to_string();
    assert_eq!(created["status"], json!("persisted"));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/evaluations/{id}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = read_json_body(response).await;
    assert_eq!(fetched["calculated_scores"], created["calculated_scores"]);
    assert_eq!(fetched["metadata"]["type"], json!("temporary_exhibition"));
}

#[tokio::test]
async fn amend_endpoint_rescores() {
    let service = Arc::new(service_with(MemoryStore::default()));
    let record = service.create(metadata(), complete_answers()).expect("created");
    let app = evaluation_router(service);

    let response = app
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/evaluations/{}/responses", record.id()),
            json!({ "responses": { "indirect_environmental": { "life_cycle": { "circularity": 10 } } } }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    assert_eq!(
        body["responses"]["indirect_environmental"]["life_cycle"]["circularity"],
        json!(10)
    );
}

#[tokio::test]
async fn unknown_evaluation_is_not_found() {
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/evaluations/6f1c2a9e-5d3b-4c1e-9a7f-2b8d4e6f1a3c")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_id_is_a_bad_request() {
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/evaluations/not-a-uuid")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_handler_returns_conflict_on_duplicate() {
    let service = Arc::new(EvaluationService::new(
        Arc::new(standard_catalog()),
        Arc::new(ConflictStore),
    ));
    let request = CreateEvaluationRequest {
        metadata: metadata(),
        responses: complete_answers().to_responses(&standard_catalog()),
    };

    let response = create_handler::<ConflictStore>(State(service), axum::Json(request)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_handler_returns_internal_error_on_store_failure() {
    let service = Arc::new(service_with(UnavailableStore));
    let request = CreateEvaluationRequest {
        metadata: metadata(),
        responses: complete_answers().to_responses(&standard_catalog()),
    };

    let response = create_handler::<UnavailableStore>(State(service), axum::Json(request)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error string")
        .contains("disk offline"));
}

#[tokio::test]
async fn validate_endpoint_reports_partial_completion() {
    let response = router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/evaluations/validate",
            json!({ "responses": { "transversal": { "measurement": { "quantified_targets": true } } } }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    assert_eq!(body["success"], json!(false));
    let measurement = body["completion"]["subcategories"]["measurement"]
        .as_f64()
        .expect("measurement share");
    assert!((measurement - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(body["completion"]["categories"]["eco_social"], json!(0.0));
}

#[tokio::test]
async fn blank_exhibition_name_is_unprocessable() {
    let store = MemoryStore::default();
    let app = evaluation_router(Arc::new(service_with(store.clone())));
    let mut metadata = serde_json::to_value(metadata()).expect("metadata serializes");
    metadata["name"] = json!("   ");

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/evaluations",
            json!({ "metadata": metadata, "responses": complete_responses() }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = read_json_body(response).await;
    assert!(body["error"].as_str().expect("error message").contains("'name'"));
    assert_eq!(store.len(), 0);
}
