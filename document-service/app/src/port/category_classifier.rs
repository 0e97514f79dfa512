use std::future::Future;
use std::pin::Pin;

use crate::error::DocumentError;

/// Assigns a category to document text.
pub trait CategoryClassifier: Send + Sync {
    fn classify(
        &self,
        text: String,
    ) -> Pin<Box<dyn Future<Output = Result<String, DocumentError>> + Send + '_>>;
}
