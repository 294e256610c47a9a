//! Document store: vehicle templates and inventory records.

mod document;
mod in_memory;

pub use document::{DocumentStore, StoreError, StoredInventory};
pub use in_memory::InMemoryDocumentStore;
