use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::{error, info};

use crate::app::AppState;
use crate::domain::{Document, DocumentCreate};
use crate::error::DocumentError;

/// Handler for POST /documents
///
/// Classifies the content through the ML service, then stores and returns the document.
pub async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<DocumentCreate>,
) -> Result<(StatusCode, Json<Document>), DocumentError> {
    let title_preview: String = request.title.chars().take(50).collect();
    info!(title = %title_preview, "Sending document to ML service for classification");

    let category = state
        .classifier
        .classify(request.content.clone())
        .await
        .inspect_err(|e| error!(title = %title_preview, "Classification failed: {e}"))?;

    let document = Document::new(request, category);
    state.store.create(document.clone()).await?;

    info!(
        id = %document.id,
        title = %document.title,
        category = document.category.as_deref().unwrap_or_default(),
        "Document classified"
    );
    Ok((StatusCode::CREATED, Json(document)))
}

/// Handler for GET /documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, DocumentError> {
    state
        .store
        .get(id.clone())
        .await?
        .map(Json)
        .ok_or(DocumentError::NotFound(id))
}
