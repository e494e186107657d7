//! Recall library crate (used by the server and integration tests).
//!
//! A semantic cache for LLM question/answer pairs: questions are normalized,
//! embedded, and matched against previously stored pairs by vector similarity.
//!
//! # Public API Surface
//!
//! ## Pipelines
//! - [`QueryPipeline`]: normalize, embed, search, select
//! - [`StorePipeline`]: validate, quality gate, embed, upsert
//! - [`CacheDeleter`]: batch and single delete, lookup by id
//!
//! ## Ports
//! - [`Embedder`] with [`RemoteEmbedder`] (OpenAI-compatible HTTP)
//! - [`VectorStore`] with [`QdrantStore`], [`RedisStore`] and [`MemoryStore`]
//!
//! ## Policies
//! - [`normalize`], [`NormalizeMode`]
//! - [`QualityGate`], [`QualityConfig`]
//! - [`ResultSelector`], [`SelectionStrategy`]
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod facade;
pub mod gateway;
pub mod normalize;
pub mod pipeline;
pub mod quality;
pub mod selector;
pub mod vectordb;

pub use config::{Config, ConfigError};
pub use embedding::{Embedder, EmbeddingError, RemoteEmbedder, RemoteEmbedderConfig};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use facade::{CacheDeleter, DeleteRequest, DeleteResult, FacadeError};
pub use normalize::{NormalizeMode, normalize, normalize_aggressive};
pub use pipeline::{
    PipelineError, QueryConfig, QueryHit, QueryOutcome, QueryPipeline, QueryRequest,
    StoreOutcome, StorePipeline, WriteRequest,
};
pub use quality::{GateOutcome, QualityConfig, QualityDecision, QualityGate, RejectReason};
pub use selector::{ResultSelector, SelectionStrategy};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorStore;
pub use vectordb::{
    CacheEntry, MemoryStore, Payload, QdrantStore, RedisStore, SearchFilter, SearchMatch,
    VectorBackend, VectorDbError, VectorStore, VectorStoreConfig, build_vector_store,
};
