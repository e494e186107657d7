//! Vector store port and its adapters.
//!
//! The pipelines only see [`VectorStore`]. Adapters:
//! - [`QdrantStore`]: native batch delete, server-side `user_type` filter.
//! - [`RedisStore`]: per-key storage, deletes one id at a time.
//! - [`MemoryStore`]: process-local, for development.

pub mod config;
pub mod error;
pub mod factory;
pub mod memory;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;
pub mod qdrant;
pub mod redis;

#[cfg(test)]
mod tests;

pub use config::{
    DEFAULT_QDRANT_URL, DEFAULT_REDIS_URL, QdrantConfig, RedisConfig, VectorBackend,
    VectorStoreConfig,
};
pub use error::{VectorDbError, VectorDbResult};
pub use factory::build_vector_store;
pub use memory::MemoryStore;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockVectorStore, RecordedSearch};
pub use model::{CacheEntry, EntryStatistics, Payload, SearchFilter, SearchMatch, cosine_similarity};
pub use qdrant::QdrantStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;

/// Persistence and nearest-neighbour search for cache entries.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Inserts or replaces an entry. Rejects vectors of the wrong dimension.
    async fn upsert(&self, entry: CacheEntry) -> VectorDbResult<()>;

    /// Returns at most `top_k` entries of `filter.user_type` scoring at least
    /// `score_threshold`, best first.
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        score_threshold: f32,
        filter: &SearchFilter,
    ) -> VectorDbResult<Vec<SearchMatch>>;

    /// Deletes all `ids` in one call.
    async fn delete(&self, ids: &[String]) -> VectorDbResult<()>;

    /// Deletes a single id. Stores without batch delete report a missing id as
    /// [`VectorDbError::NotFound`].
    async fn delete_one(&self, id: &str) -> VectorDbResult<()> {
        self.delete(&[id.to_string()]).await
    }

    /// Returns the payload of `id`, or [`VectorDbError::NotFound`].
    async fn get_by_id(&self, id: &str) -> VectorDbResult<Payload>;

    /// `true` when [`delete`](VectorStore::delete) is a single backend call.
    fn supports_batch_delete(&self) -> bool {
        true
    }

    async fn health_check(&self) -> VectorDbResult<()> {
        Ok(())
    }
}
