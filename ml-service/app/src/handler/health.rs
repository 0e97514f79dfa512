use axum::Json;
use serde_json::{Value, json};
use tracing::info;

/// Handler for GET /health
pub async fn health_handler() -> &'static str {
    info!("Health check requested");
    "Healthy"
}

/// Handler for GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "ML classification service is running" }))
}
