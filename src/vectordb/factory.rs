use std::sync::Arc;

use tracing::info;

use super::config::{VectorBackend, VectorStoreConfig};
use super::error::VectorDbResult;
use super::memory::MemoryStore;
use super::qdrant::QdrantStore;
use super::redis::RedisStore;
use super::VectorStore;

/// Builds the [`VectorStore`] implementation selected by `config.backend`.
///
/// Qdrant collections are created on first start.
pub async fn build_vector_store(config: &VectorStoreConfig) -> VectorDbResult<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match config.backend {
        VectorBackend::Qdrant => {
            let store = QdrantStore::new(config.qdrant.clone())?;
            store.ensure_collection().await?;
            Arc::new(store)
        }
        VectorBackend::Redis => Arc::new(RedisStore::connect(config.redis.clone()).await?),
        VectorBackend::Memory => Arc::new(MemoryStore::new(config.vector_size() as usize)),
    };

    info!(
        backend = store.backend_name(),
        batch_delete = store.supports_batch_delete(),
        "vector store ready"
    );
    Ok(store)
}
