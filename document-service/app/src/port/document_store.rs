use std::future::Future;
use std::pin::Pin;

use crate::domain::Document;
use crate::error::DocumentError;

/// Persistence for classified documents.
pub trait DocumentStore: Send + Sync {
    fn create(
        &self,
        document: Document,
    ) -> Pin<Box<dyn Future<Output = Result<(), DocumentError>> + Send + '_>>;

    /// Returns `Ok(None)` when no document has this id.
    fn get(
        &self,
        id: String,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Document>, DocumentError>> + Send + '_>>;
}
