use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use super::state::AppState;
use crate::handler::classify::{classify_handler, probabilities_handler};
use crate::handler::health::{health_handler, root_handler};

/// Build the HTTP router (root, health and classification endpoints).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/classify", post(classify_handler))
        .route("/classify/probabilities", post(probabilities_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
