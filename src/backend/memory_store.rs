use std::sync::RwLock;

use crate::backend::document::{StoreDocument, DocumentAccess};
use crate::backend::interface::{BackendError, Result};

/// Store that lives only as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    doc: RwLock<StoreDocument>
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn with_document(doc: StoreDocument) -> MemoryStore {
        MemoryStore { doc: RwLock::new(doc) }
    }

    pub fn snapshot(&self) -> Result<StoreDocument> {
        self.view(|doc| doc.clone())
    }
}

impl DocumentAccess for MemoryStore {
    fn view<T>(&self, f: impl FnOnce(&StoreDocument) -> T) -> Result<T> {
        let doc = self.doc.read().map_err(|_| BackendError::Poisoned)?;
        return Ok(f(&doc));
    }

    fn update<T>(&self, f: impl FnOnce(&mut StoreDocument) -> T) -> Result<T> {
        let mut doc = self.doc.write().map_err(|_| BackendError::Poisoned)?;
        return Ok(f(&mut doc));
    }
}
