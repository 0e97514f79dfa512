use std::path::Path;

use axum::http::StatusCode;
use axum_test::TestServer;
use ml_service::app::{AppState, router};
use ml_service::handler::classify::{ClassifyResponse, ProbabilitiesResponse};
use ml_service::model::{ClassificationModel, SvmOptions};
use ml_service::preprocess::{Language, Preprocessor};
use ml_service::training::{DatasetColumns, load_dataset};
use serde_json::json;

/// Fits a model on the bundled sample dataset.
fn trained_model() -> ClassificationModel {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("training/data/reportes.csv");
    let examples = load_dataset(&path, &DatasetColumns::default()).unwrap();
    let preprocessor = Preprocessor::new(Language::Spanish);
    let (texts, labels): (Vec<String>, Vec<String>) = examples
        .into_iter()
        .map(|e| (preprocessor.preprocess(e.raw_text.as_deref()), e.category))
        .unzip();
    ClassificationModel::fit(&texts, &labels, Language::Spanish, &SvmOptions::default()).unwrap()
}

fn test_server() -> TestServer {
    TestServer::new(router(AppState::new(trained_model()))).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_returns_healthy() {
    let server = test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("Healthy");
}

#[tokio::test]
async fn test_root_endpoint_reports_running() {
    let server = test_server();

    let response = server.get("/").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "message": "ML classification service is running" }));
}

#[tokio::test]
async fn test_classify_returns_trained_category() {
    let server = test_server();

    let response = server
        .post("/classify")
        .json(&json!({ "text": "Este informe detalla los ingresos del trimestre" }))
        .await;

    response.assert_status_ok();
    let body: ClassifyResponse = response.json();
    assert_eq!(body.category, "Finanzas");
}

#[tokio::test]
async fn test_classify_separates_other_categories() {
    let server = test_server();

    let cases = [
        ("El servidor de base de datos necesita una actualización de software", "Tecnología"),
        ("El tribunal revisó el contrato y la demanda", "Legal"),
        ("Proceso de selección y formación de nuevos empleados", "Recursos Humanos"),
    ];
    for (text, expected) in cases {
        let response = server.post("/classify").json(&json!({ "text": text })).await;
        response.assert_status_ok();
        let body: ClassifyResponse = response.json();
        assert_eq!(body.category, expected, "text: {text}");
    }
}

#[tokio::test]
async fn test_classify_rejects_empty_text() {
    let server = test_server();

    let response = server.post("/classify").json(&json!({ "text": "" })).await;

    response.assert_status_bad_request();
    response.assert_json(&json!({ "detail": "document text must not be empty" }));
}

#[tokio::test]
async fn test_classify_accepts_whitespace_only_text() {
    let server = test_server();

    let response = server
        .post("/classify")
        .json(&json!({ "text": "   \n\t" }))
        .await;

    response.assert_status_ok();
    let body: ClassifyResponse = response.json();
    assert!(
        ["Finanzas", "Legal", "Recursos Humanos", "Tecnología"].contains(&body.category.as_str())
    );
}

#[tokio::test]
async fn test_classify_accepts_text_without_known_terms() {
    let server = test_server();

    let response = server
        .post("/classify")
        .json(&json!({ "text": "2024 !!! 123" }))
        .await;

    response.assert_status_ok();
    let body: ClassifyResponse = response.json();
    assert!(
        ["Finanzas", "Legal", "Recursos Humanos", "Tecnología"].contains(&body.category.as_str())
    );
}

#[tokio::test]
async fn test_classify_requires_text_field() {
    let server = test_server();

    let response = server.post("/classify").json(&json!({ "body": "hola" })).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_probabilities_are_ranked_and_agree_with_classify() {
    let server = test_server();
    let text = "La auditoría revisó las facturas y el balance";

    let category: ClassifyResponse = server
        .post("/classify")
        .json(&json!({ "text": text }))
        .await
        .json();
    let response = server
        .post("/classify/probabilities")
        .json(&json!({ "text": text }))
        .await;

    response.assert_status_ok();
    let body: ProbabilitiesResponse = response.json();
    assert_eq!(body.probabilities.len(), 4);
    assert_eq!(body.category, body.probabilities[0].category);
    assert_eq!(body.category, category.category);
    assert!(
        body.probabilities
            .windows(2)
            .all(|pair| pair[0].probability >= pair[1].probability)
    );
    let total: f64 = body.probabilities.iter().map(|p| p.probability).sum();
    assert!((total - 1.0).abs() < 1e-6, "sum was {total}");
}

#[tokio::test]
async fn test_probabilities_reject_empty_text() {
    let server = test_server();

    let response = server
        .post("/classify/probabilities")
        .json(&json!({ "text": "" }))
        .await;

    response.assert_status_bad_request();
}
