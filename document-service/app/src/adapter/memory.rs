use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;

use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::Document;
use crate::error::DocumentError;
use crate::port::DocumentStore;

/// Documents kept by [`InMemoryDocumentStore::new`].
pub const DEFAULT_STORE_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct StoreState {
    documents: HashMap<String, Document>,
    /// Ids in insertion order, oldest first.
    order: VecDeque<String>,
}

/// Process-local document store holding at most `capacity` documents.
///
/// Inserting past the bound evicts the oldest document. Contents are lost on restart.
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    capacity: usize,
    state: RwLock<StoreState>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STORE_CAPACITY)
    }

    /// A capacity of 0 is treated as 1.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: RwLock::new(StoreState::default()),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn create(
        &self,
        document: Document,
    ) -> Pin<Box<dyn Future<Output = Result<(), DocumentError>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.state.write().await;
            if state.documents.contains_key(&document.id) {
                return Err(DocumentError::Internal(format!(
                    "document id {} already exists",
                    document.id
                )));
            }

            while state.documents.len() >= self.capacity {
                let Some(oldest) = state.order.pop_front() else {
                    break;
                };
                state.documents.remove(&oldest);
                debug!(id = %oldest, capacity = self.capacity, "evicted oldest document");
            }

            state.order.push_back(document.id.clone());
            state.documents.insert(document.id.clone(), document);
            Ok(())
        })
    }

    fn get(
        &self,
        id: String,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Document>, DocumentError>> + Send + '_>> {
        Box::pin(async move { Ok(self.state.read().await.documents.get(&id).cloned()) })
    }
}
