use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;
use crate::model::ModelError;

/// Fatal errors of the service process.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load model: {0}")]
    Model(#[from] ModelError),

    #[error("Failed to bind to address {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Errors returned by the classification endpoints, rendered as `{"detail": ...}`.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("document text must not be empty")]
    EmptyText,

    #[error("internal error while classifying document: {0}")]
    Prediction(String),
}

impl ClassifyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ClassifyError::EmptyText => StatusCode::BAD_REQUEST,
            ClassifyError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ClassifyError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
