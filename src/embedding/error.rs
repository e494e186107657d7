use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding provider not configured: {reason}")]
    NotConfigured { reason: String },

    #[error("embedding request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("embedding provider returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("invalid embedding response: {reason}")]
    InvalidResponse { reason: String },

    #[error("embedding count mismatch: sent {expected} inputs, got {actual} vectors")]
    CountMismatch { expected: usize, actual: usize },

    #[error("embedding provider returned no vectors")]
    EmptyResult,

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("invalid embedding configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EmbeddingError::InvalidResponse {
                reason: err.to_string(),
            }
        } else {
            EmbeddingError::RequestFailed {
                reason: err.to_string(),
            }
        }
    }
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;
