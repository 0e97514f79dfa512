pub mod category_classifier;
pub mod document_store;

pub use category_classifier::CategoryClassifier;
pub use document_store::DocumentStore;
