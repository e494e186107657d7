//! Cross-cutting, shared constants.
//!
//! Module-specific defaults live next to their config types; the values here are
//! referenced from more than one module (config, pipeline, vectordb, gateway).

/// Default embedding dimension (OpenAI `text-embedding-3-small`).
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

pub const DEFAULT_VECTOR_SIZE_U64: u64 = DEFAULT_EMBEDDING_DIM as u64;

pub const DEFAULT_COLLECTION_NAME: &str = "llm_cache";

pub const DEFAULT_TOP_K: usize = 5;

/// Largest `top_k` a caller may request.
pub const MAX_TOP_K: usize = 100;

pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.7;

/// Upper bound applied to similarity scores returned by a backend.
///
/// Cosine scores from some engines overshoot 1.0 slightly; anything up to this
/// bound is passed through, anything above is clamped.
pub const MAX_SIMILARITY_SCORE: f32 = 1.1;

/// Maximum question length accepted at the request boundary (chars).
pub const MAX_QUESTION_CHARS: usize = 1000;

/// Maximum answer length accepted at the request boundary (chars).
pub const MAX_ANSWER_CHARS: usize = 10_000;

/// Payload keys written by the store pipeline. Caller metadata may not override them.
pub const PAYLOAD_QUESTION: &str = "question";
pub const PAYLOAD_ANSWER: &str = "answer";
pub const PAYLOAD_USER_TYPE: &str = "user_type";
pub const PAYLOAD_CREATED_AT: &str = "created_at";
pub const PAYLOAD_QUALITY_SCORE: &str = "quality_score";
pub const PAYLOAD_SCORE: &str = "score";
pub const PAYLOAD_SCORE_FALLBACK: &str = "_score";

pub const RESERVED_PAYLOAD_KEYS: [&str; 5] = [
    PAYLOAD_QUESTION,
    PAYLOAD_ANSWER,
    PAYLOAD_USER_TYPE,
    PAYLOAD_CREATED_AT,
    PAYLOAD_QUALITY_SCORE,
];

/// Clamps a backend score into `[0.0, MAX_SIMILARITY_SCORE]`.
#[inline]
pub fn clamp_similarity(score: f32) -> f32 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, MAX_SIMILARITY_SCORE)
}

/// Error returned when a vector does not match the collection dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub expected: usize,
    pub actual: usize,
}

impl std::fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dimension mismatch: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for DimensionMismatch {}

/// Validates that a vector length matches the configured collection dimension.
///
/// # Example
///
/// ```
/// use recall::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// assert!(validate_embedding_dim(1536, DEFAULT_EMBEDDING_DIM).is_ok());
/// assert!(validate_embedding_dim(768, DEFAULT_EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimensionMismatch> {
    if actual != expected {
        return Err(DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_similarity_passes_through_tolerated_overshoot() {
        assert_eq!(clamp_similarity(0.93), 0.93);
        assert_eq!(clamp_similarity(1.05), 1.05);
    }

    #[test]
    fn test_clamp_similarity_bounds() {
        assert_eq!(clamp_similarity(1.7), MAX_SIMILARITY_SCORE);
        assert_eq!(clamp_similarity(-0.2), 0.0);
        assert_eq!(clamp_similarity(f32::NAN), 0.0);
    }

    #[test]
    fn test_validate_embedding_dim_mismatch() {
        assert_eq!(
            validate_embedding_dim(768, 1536),
            Err(DimensionMismatch {
                expected: 1536,
                actual: 768
            })
        );
        let err = validate_embedding_dim(3, 4).unwrap_err();
        assert!(err.to_string().contains("expected 4"));
    }
}
