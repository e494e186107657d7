use crate::constants::{DEFAULT_COLLECTION_NAME, DEFAULT_VECTOR_SIZE_U64};

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Vector store backend selection.
pub enum VectorBackend {
    #[default]
    Qdrant,
    /// Per-key Redis storage (no native batch delete).
    Redis,
    /// Process-local store; contents are lost on restart.
    Memory,
}

impl VectorBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorBackend::Qdrant => "qdrant",
            VectorBackend::Redis => "redis",
            VectorBackend::Memory => "memory",
        }
    }
}

impl std::str::FromStr for VectorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "qdrant" => Ok(Self::Qdrant),
            "redis" => Ok(Self::Redis),
            "memory" | "inmemory" | "in_memory" => Ok(Self::Memory),
            _ => Err(format!("Unknown vector backend: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub vector_size: u64,
    /// Wait for writes to be indexed before returning.
    pub wait: bool,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_QDRANT_URL.to_string(),
            api_key: None,
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            vector_size: DEFAULT_VECTOR_SIZE_U64,
            wait: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// Key prefix; entries live at `{prefix}:{id}`.
    pub prefix: String,
    pub vector_size: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            prefix: DEFAULT_COLLECTION_NAME.to_string(),
            vector_size: DEFAULT_VECTOR_SIZE_U64,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Everything [`build_vector_store`](super::build_vector_store) needs.
pub struct VectorStoreConfig {
    pub backend: VectorBackend,
    pub qdrant: QdrantConfig,
    pub redis: RedisConfig,
}

impl VectorStoreConfig {
    pub fn vector_size(&self) -> u64 {
        match self.backend {
            VectorBackend::Qdrant | VectorBackend::Memory => self.qdrant.vector_size,
            VectorBackend::Redis => self.redis.vector_size,
        }
    }
}
