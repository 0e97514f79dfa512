use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;

/// Fatal errors of the service process.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build ML service client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to bind to address {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Errors returned by the document endpoints, rendered as `{"detail": ...}`.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Connection failure or timeout while calling the ML service.
    #[error("failed to reach ML service: {0}")]
    UpstreamUnavailable(#[source] reqwest::Error),

    /// The ML service answered with a non-success status.
    #[error("ML service error: {body}")]
    UpstreamRejected { status: StatusCode, body: String },

    #[error("unexpected error while classifying document: {0}")]
    Internal(String),

    #[error("document {0} not found")]
    NotFound(String),
}

impl DocumentError {
    fn status_code(&self) -> StatusCode {
        match self {
            DocumentError::UpstreamUnavailable(_) | DocumentError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DocumentError::UpstreamRejected { status, .. } => *status,
            DocumentError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for DocumentError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
