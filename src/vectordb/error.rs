use thiserror::Error;

use crate::constants::DimensionMismatch;

#[derive(Debug, Error)]
/// Errors returned by vector store operations.
pub enum VectorDbError {
    /// Could not connect to the backend.
    #[error("failed to connect to vector store at '{url}': {message}")]
    ConnectionFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Collection creation failed.
    #[error("failed to create collection '{collection}': {message}")]
    CreateCollectionFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Upsert failed.
    #[error("failed to upsert into '{collection}': {message}")]
    UpsertFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Search failed.
    #[error("failed to search in '{collection}': {message}")]
    SearchFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Point lookup failed for a reason other than absence.
    #[error("failed to fetch '{id}' from '{collection}': {message}")]
    GetFailed {
        collection: String,
        id: String,
        message: String,
    },

    /// Delete failed.
    #[error("failed to delete from '{collection}': {message}")]
    DeleteFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// No entry with this id exists.
    #[error("cache not found: {id}")]
    NotFound { id: String },

    /// Vector dimension mismatch.
    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// A stored record could not be encoded or decoded.
    #[error("failed to (de)serialize entry '{id}': {message}")]
    Serialization { id: String, message: String },
}

impl VectorDbError {
    /// Returns `true` for the expected "no such entry" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VectorDbError::NotFound { .. })
    }
}

pub type VectorDbResult<T> = Result<T, VectorDbError>;

impl From<DimensionMismatch> for VectorDbError {
    fn from(e: DimensionMismatch) -> Self {
        VectorDbError::InvalidDimension {
            expected: e.expected,
            actual: e.actual,
        }
    }
}
