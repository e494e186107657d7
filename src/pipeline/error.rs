use std::time::Duration;

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
/// Hard failures of the query and store pipelines.
///
/// A quality rejection or a cache miss is data, not an error.
pub enum PipelineError {
    /// Request violates an input invariant; no port was called.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector store error: {0}")]
    VectorDb(#[from] VectorDbError),

    /// A port call exceeded its deadline.
    #[error("{stage} timed out after {after:?}")]
    Timeout {
        stage: &'static str,
        after: Duration,
    },
}

impl PipelineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, PipelineError::Validation(_))
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
