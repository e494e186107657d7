use std::sync::Arc;
use std::time::Duration;

use crate::config::{DEFAULT_CACHE_TTL, DEFAULT_MAX_CACHE_SIZE};
use crate::facade::CacheDeleter;
use crate::pipeline::{QueryPipeline, StorePipeline};
use crate::vectordb::VectorStore;

#[derive(Clone)]
pub struct AppState {
    pub query: Arc<QueryPipeline>,

    pub store: Arc<StorePipeline>,

    pub deleter: Arc<CacheDeleter>,

    /// Used for health probes only; the pipelines hold their own handle.
    pub backend: Arc<dyn VectorStore>,

    /// Reported by the health endpoint; not enforced here.
    pub cache_ttl: Duration,

    pub max_cache_size: u64,
}

impl AppState {
    /// Wires both pipelines and the deleter onto the same backend.
    pub fn new(query: QueryPipeline, store: StorePipeline, backend: Arc<dyn VectorStore>) -> Self {
        Self {
            query: Arc::new(query),
            store: Arc::new(store),
            deleter: Arc::new(CacheDeleter::new(backend.clone())),
            backend,
            cache_ttl: DEFAULT_CACHE_TTL,
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
        }
    }

    /// Deadline for each backend call made by the deleter and the health probe.
    pub fn with_port_timeout(mut self, timeout: Duration) -> Self {
        self.deleter = Arc::new(CacheDeleter::new(self.backend.clone()).port_timeout(timeout));
        self
    }

    pub fn with_retention(mut self, cache_ttl: Duration, max_cache_size: u64) -> Self {
        self.cache_ttl = cache_ttl;
        self.max_cache_size = max_cache_size;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.backend.backend_name())
            .field("cache_ttl", &self.cache_ttl)
            .field("max_cache_size", &self.max_cache_size)
            .finish_non_exhaustive()
    }
}
