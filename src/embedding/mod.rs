//! Embedding port and its adapters.
//!
//! - [`Embedder`] is the trait the pipelines depend on.
//! - [`remote`] talks to an OpenAI-compatible `/embeddings` endpoint.
//! - [`mock`] is a deterministic, offline embedder for tests.

mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod remote;

#[cfg(test)]
mod tests;

pub use error::{EmbeddingError, EmbeddingResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use remote::{DEFAULT_EMBEDDING_MODEL, RemoteEmbedder, RemoteEmbedderConfig};

use async_trait::async_trait;

/// Turns text into fixed-length vectors.
///
/// Any error is fatal to the calling pipeline; implementations must not fall back
/// to a placeholder vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds a single text.
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        if vectors.is_empty() {
            return Err(EmbeddingError::EmptyResult);
        }
        Ok(vectors.swap_remove(0))
    }

    /// Embeds several texts, returning one vector per input in input order.
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>>;

    /// Output dimension.
    fn dimension(&self) -> usize;
}

/// Scales `v` to unit L2 norm in place. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
