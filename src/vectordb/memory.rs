use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::{VectorDbError, VectorDbResult};
use super::model::{CacheEntry, Payload, SearchFilter, SearchMatch, rank_entries};
use super::VectorStore;
use crate::constants::validate_embedding_dim;

/// Process-local store with brute-force cosine search. Useful for development
/// and as the backing map of the test double.
#[derive(Debug, Default)]
pub struct MemoryStore {
    vector_size: usize,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new(vector_size: usize) -> Self {
        Self {
            vector_size,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn vector_size(&self) -> usize {
        self.vector_size
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    pub fn entry(&self, id: &str) -> Option<CacheEntry> {
        self.entries.read().get(id).cloned()
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn upsert(&self, entry: CacheEntry) -> VectorDbResult<()> {
        validate_embedding_dim(entry.vector.len(), self.vector_size)?;
        self.entries.write().insert(entry.id.clone(), entry);
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        score_threshold: f32,
        filter: &SearchFilter,
    ) -> VectorDbResult<Vec<SearchMatch>> {
        let entries = self.entries.read();
        Ok(rank_entries(
            entries.values(),
            vector,
            top_k,
            score_threshold,
            filter,
        ))
    }

    async fn delete(&self, ids: &[String]) -> VectorDbResult<()> {
        let mut entries = self.entries.write();
        for id in ids {
            entries.remove(id);
        }
        Ok(())
    }

    async fn delete_one(&self, id: &str) -> VectorDbResult<()> {
        self.entries
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| VectorDbError::NotFound { id: id.to_string() })
    }

    async fn get_by_id(&self, id: &str) -> VectorDbResult<Payload> {
        self.entries
            .read()
            .get(id)
            .map(CacheEntry::to_payload)
            .ok_or_else(|| VectorDbError::NotFound { id: id.to_string() })
    }
}
