mod interface;
mod document;
mod json_store;
mod memory_store;

pub use interface::{LedgerStore, MessageStore, Result, BackendError};
pub use document::{StoreDocument, DocumentAccess};
pub use json_store::JsonStore;
pub use memory_store::MemoryStore;
