use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body of `POST /documents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentCreate {
    pub title: String,
    pub content: String,
}

/// A classified document as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub created_at: String,
}

impl Document {
    /// Builds a document with a fresh `doc_xxxxxxxx` id stamped with the current UTC time.
    #[must_use]
    pub fn new(request: DocumentCreate, category: String) -> Self {
        Self::with_timestamp(request, category, Utc::now())
    }

    fn with_timestamp(request: DocumentCreate, category: String, now: DateTime<Utc>) -> Self {
        Self {
            id: new_document_id(),
            title: request.title,
            content: request.content,
            category: Some(category),
            created_at: now.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        }
    }
}

/// `doc_` followed by 8 lowercase hex digits from 4 random bytes.
#[must_use]
pub fn new_document_id() -> String {
    format!("doc_{:08x}", rand::random::<u32>())
}
