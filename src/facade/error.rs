use std::time::Duration;

use thiserror::Error;

use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("cache not found: {id}")]
    NotFound { id: String },

    #[error("vector store error: {0}")]
    Backend(VectorDbError),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl FacadeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FacadeError::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FacadeError::Timeout { .. })
    }
}

impl From<VectorDbError> for FacadeError {
    fn from(err: VectorDbError) -> Self {
        match err {
            VectorDbError::NotFound { id } => FacadeError::NotFound { id },
            other => FacadeError::Backend(other),
        }
    }
}

pub type FacadeResult<T> = Result<T, FacadeError>;
