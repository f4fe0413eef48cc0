use crate::error::Result;
use crate::types::Document;
use async_trait::async_trait;

/// Read-only view of the full document collection. Owned by the storage
/// collaborator; the pipeline never writes through it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_all_documents(&self) -> Result<Vec<Document>>;
}

/// Shared cache collaborator. Absence is `None`, never an error; both
/// methods must be safe to call concurrently.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String, ttl_secs: u64);
}

/// Opaque text-completion provider. May fail or time out; callers own the
/// deadline.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;
}
