//! In-memory reference implementation of the `DocumentStore` collaborator.
//! Persistence lives outside this system; the CLI loads a snapshot into one
//! of these at startup.

use std::sync::RwLock;

use async_trait::async_trait;
use ragline_core::error::Result;
use ragline_core::traits::DocumentStore;
use ragline_core::types::Document;

#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents: RwLock::new(documents) }
    }

    pub fn add_documents(&self, documents: Vec<Document>) {
        self.documents
            .write()
            .expect("store lock poisoned")
            .extend(documents);
    }

    pub fn len(&self) -> usize {
        self.documents.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_all_documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.read().expect("store lock poisoned").clone())
    }
}
