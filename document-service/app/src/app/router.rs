use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use super::state::AppState;
use crate::handler::documents::{create_document, get_document};
use crate::handler::health::{health_handler, root_handler};

/// Build the HTTP router (root, health and document endpoints).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/documents", post(create_document))
        .route("/documents/{id}", get(get_document))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
