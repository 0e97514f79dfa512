pub mod memory;

pub use memory::{DEFAULT_STORE_CAPACITY, InMemoryDocumentStore};
