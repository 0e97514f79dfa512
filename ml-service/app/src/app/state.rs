use std::sync::Arc;

use crate::model::ClassificationModel;
use crate::preprocess::Preprocessor;

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ClassificationModel>,
    pub preprocessor: Arc<Preprocessor>,
}

impl AppState {
    /// Wraps a loaded model together with the preprocessor it was trained with.
    #[must_use]
    pub fn new(model: ClassificationModel) -> Self {
        let preprocessor = Arc::new(model.preprocessor());
        Self {
            model: Arc::new(model),
            preprocessor,
        }
    }
}
