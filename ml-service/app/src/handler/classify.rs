use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::app::AppState;
use crate::error::ClassifyError;
use crate::model::ClassificationModel;

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryProbability {
    pub category: String,
    pub probability: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProbabilitiesResponse {
    pub category: String,
    pub probabilities: Vec<CategoryProbability>,
}

/// Handler for POST /classify
pub async fn classify_handler(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ClassifyError> {
    let chars = request.text.chars().count();
    let category = with_model(&state, request.text, |model, cleaned| {
        model.predict(cleaned).to_string()
    })
    .await?;

    info!(chars, category = %category, "classified document");
    Ok(Json(ClassifyResponse { category }))
}

/// Handler for POST /classify/probabilities
pub async fn probabilities_handler(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ProbabilitiesResponse>, ClassifyError> {
    let ranked = with_model(&state, request.text, |model, cleaned| {
        model.predict_proba(cleaned)
    })
    .await?;

    let category = ranked
        .first()
        .map(|(category, _)| category.clone())
        .ok_or_else(|| ClassifyError::Prediction("model returned no categories".to_string()))?;
    info!(category = %category, classes = ranked.len(), "scored document");

    Ok(Json(ProbabilitiesResponse {
        category,
        probabilities: ranked
            .into_iter()
            .map(|(category, probability)| CategoryProbability {
                category,
                probability,
            })
            .collect(),
    }))
}

/// Rejects empty text, then preprocesses and runs `infer` off the async workers.
async fn with_model<T, F>(state: &AppState, text: String, infer: F) -> Result<T, ClassifyError>
where
    T: Send + 'static,
    F: FnOnce(&ClassificationModel, &str) -> T + Send + 'static,
{
    if text.is_empty() {
        return Err(ClassifyError::EmptyText);
    }

    let model = Arc::clone(&state.model);
    let preprocessor = Arc::clone(&state.preprocessor);
    tokio::task::spawn_blocking(move || {
        let cleaned = preprocessor.preprocess(Some(&text));
        infer(model.as_ref(), cleaned.as_str())
    })
    .await
    .map_err(|e| {
        error!("Classification task failed: {e}");
        ClassifyError::Prediction(e.to_string())
    })
}
