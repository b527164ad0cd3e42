//! REST API tests through the router, plus one over a real socket

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use octanebuddy::client::PredictionClient;
use octanebuddy::model::ConstantRegressor;
use octanebuddy::server::{router, AppState};
use octanebuddy::{ModelService, PredictionPipeline, PredictorError, RawInputs};

fn state(value: f64) -> AppState {
    let model = ModelService::with_regressor(
        "api-const",
        &["PARAFINAS", "Ox"],
        Box::new(ConstantRegressor::new(value)),
    )
    .unwrap();
    AppState::new(Arc::new(PredictionPipeline::new(Arc::new(model))))
}

fn app(value: f64) -> Router {
    router(state(value))
}

fn example_body() -> Value {
    json!({
        "PARAFINAS": 10.5,
        "ISOPARAFINAS": 32.0,
        "OLEFINAS": 8.5,
        "NAFTENICOS": 6.2,
        "AROMATICOS": 38.0,
        "ETANOL": 4.8,
        "MTBE": 0,
        "ETBE": "0"
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_predict_returns_classified_result() {
    let response = app(96.4)
        .oneshot(post_json("/predict", &example_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let body = json_body(response).await;
    assert_eq!(body["predicted_value"], 96.4);
    assert_eq!(body["rounded_value"], 96);
    assert_eq!(body["classification"]["category"], "PREMIUM");
    assert_eq!(body["classification"]["nc_code"], "2710.12.45");
    assert!((body["ox"].as_f64().unwrap() - 4.8).abs() < 1e-12);
}

#[tokio::test]
async fn test_missing_variable_is_400() {
    let mut body = example_body();
    body.as_object_mut().unwrap().remove("OLEFINAS");

    let response = app(96.0).oneshot(post_json("/predict", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "missing_variable");
    assert_eq!(body["variable"], "OLEFINAS");
}

#[tokio::test]
async fn test_invalid_number_is_400() {
    let mut body = example_body();
    body["ETBE"] = json!("n/a");

    let response = app(96.0).oneshot(post_json("/predict", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "invalid_number");
    assert_eq!(body["value"], "n/a");
}

#[tokio::test]
async fn test_duplicate_alias_is_400() {
    let mut body = example_body();
    body["NAFTÉNICOS"] = json!(7.1);

    let response = app(96.0).oneshot(post_json("/predict", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "duplicate_variable");
    assert_eq!(body["variable"], "NAFTENICOS");
    assert_eq!(body["value"], "NAFTENICOS, NAFTÉNICOS");
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ PARAFINAS: "))
        .unwrap();
    let response = app(96.0).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["kind"], "invalid_body");
}

#[tokio::test]
async fn test_preflight_is_204_with_cors_headers() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/predict")
        .header(header::ORIGIN, "http://dashboard.local")
        .body(Body::empty())
        .unwrap();
    let response = app(96.0).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(headers[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .contains("POST"));
}

#[tokio::test]
async fn test_export_is_csv_attachment() {
    let response = app(99.0)
        .oneshot(post_json("/export", &example_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("SUPER"));
}

#[tokio::test]
async fn test_reference_tables() {
    let ranges = json_body(app(96.0).oneshot(get("/ranges")).await.unwrap()).await;
    let rows = ranges.as_array().unwrap();
    assert_eq!(rows.len(), 9);
    assert_eq!(rows[8]["variable"], "Ox");

    let categories = json_body(app(96.0).oneshot(get("/categories")).await.unwrap()).await;
    assert_eq!(categories.as_array().unwrap().len(), 3);

    let example = json_body(app(96.0).oneshot(get("/example")).await.unwrap()).await;
    assert!((example["component_sum"].as_f64().unwrap() - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_health_info_and_dashboard() {
    let health = json_body(app(96.0).oneshot(get("/health")).await.unwrap()).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["model"], "api-const");

    let info = json_body(app(96.0).oneshot(get("/info")).await.unwrap()).await;
    assert_eq!(info["algorithm"], "Constant");

    let response = app(96.0).oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
}

#[tokio::test]
async fn test_stats_count_served_and_rejected() {
    let state = state(96.0);
    let app = router(state.clone());

    app.clone()
        .oneshot(post_json("/predict", &example_body()))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_json("/predict", &json!({"PARAFINAS": 1})))
        .await
        .unwrap();

    let stats = state.telemetry.get_stats();
    assert_eq!(stats.predictions, 1);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.by_category.get("PREMIUM"), Some(&1));
}

#[tokio::test]
async fn test_client_against_live_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app(94.8)).await.unwrap();
    });

    let client = PredictionClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let health = client.health().await.unwrap();
    assert_eq!(health.model, "api-const");

    let raw: RawInputs = serde_json::from_value(example_body()).unwrap();
    let result = client.predict(&raw).await.unwrap();
    assert_eq!(result.rounded_value, 95);
    assert!(result.critical_zone.is_some());

    let err = client
        .predict(&RawInputs::new().with("PARAFINAS", 1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, PredictorError::MissingVariable { ref name } if name == "ISOPARAFINAS"));

    server.abort();
}
