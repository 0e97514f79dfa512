use std::sync::Arc;

use crate::adapter::InMemoryDocumentStore;
use crate::client::MlServiceClient;
use crate::config::Settings;
use crate::error::ServiceError;
use crate::port::{CategoryClassifier, DocumentStore};

/// Shared application state holding the classifier and the document store.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn CategoryClassifier>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    #[must_use]
    pub fn new(classifier: Arc<dyn CategoryClassifier>, store: Arc<dyn DocumentStore>) -> Self {
        Self { classifier, store }
    }

    /// Create `AppState` from configuration settings.
    ///
    /// Builds the single ML service client used for the lifetime of the process.
    pub fn from_settings(settings: &Settings) -> Result<Self, ServiceError> {
        let client = MlServiceClient::new(
            settings.ml_service_url.clone(),
            settings.ml_service_timeout,
        )
        .map_err(ServiceError::Client)?;

        Ok(Self::new(
            Arc::new(client),
            Arc::new(InMemoryDocumentStore::with_capacity(settings.store_capacity)),
        ))
    }
}
