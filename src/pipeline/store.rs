use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::constants::{PAYLOAD_QUALITY_SCORE, RESERVED_PAYLOAD_KEYS};
use crate::embedding::{Embedder, EmbeddingError};
use crate::quality::{GateOutcome, QualityGate};
use crate::vectordb::{CacheEntry, Payload, VectorStore};

use super::config::{DEFAULT_EMBEDDING_TIMEOUT, DEFAULT_RETRIEVE_TIMEOUT};
use super::error::PipelineResult;
use super::types::{StoreOutcome, WriteRequest};
use super::with_deadline;

/// gate → {rejected | embed → index}.
pub struct StorePipeline {
    gate: QualityGate,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    embedding_timeout: Duration,
    index_timeout: Duration,
}

impl std::fmt::Debug for StorePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorePipeline")
            .field("gate", &self.gate)
            .field("backend", &self.store.backend_name())
            .field("embedding_timeout", &self.embedding_timeout)
            .field("index_timeout", &self.index_timeout)
            .finish_non_exhaustive()
    }
}

impl StorePipeline {
    pub fn new(gate: QualityGate, embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            gate,
            embedder,
            store,
            embedding_timeout: DEFAULT_EMBEDDING_TIMEOUT,
            index_timeout: DEFAULT_RETRIEVE_TIMEOUT,
        }
    }

    /// Deadlines for the embed call and the upsert call.
    pub fn timeouts(mut self, embedding: Duration, index: Duration) -> Self {
        self.embedding_timeout = embedding;
        self.index_timeout = index;
        self
    }

    pub fn gate(&self) -> &QualityGate {
        &self.gate
    }

    /// Gates, embeds and writes one question/answer pair.
    ///
    /// A gate rejection returns [`StoreOutcome::Rejected`] without touching either
    /// port. Port failures are errors.
    #[instrument(
        skip(self, request),
        fields(user_type = %request.user_type, question_len = request.question.len(), force = request.force_write)
    )]
    pub async fn store(&self, request: &WriteRequest) -> PipelineResult<StoreOutcome> {
        request.validate()?;

        let decision = self.gate.check(
            &request.question,
            &request.answer,
            &request.user_type,
            request.force_write,
        );
        let quality_score = match GateOutcome::from(decision) {
            GateOutcome::Rejected { reason } => {
                info!(reason = %reason, "write rejected by quality gate");
                return Ok(StoreOutcome::Rejected { reason });
            }
            GateOutcome::Passed { score } => score,
        };

        let mut vectors = with_deadline(
            "embedding",
            self.embedding_timeout,
            self.embedder.embed_batch(std::slice::from_ref(&request.question)),
        )
        .await?;
        if vectors.is_empty() {
            return Err(EmbeddingError::EmptyResult.into());
        }
        let vector = vectors.swap_remove(0);
        debug!(embedding_dim = vector.len(), "question embedded");

        let cache_id = Uuid::new_v4().to_string();
        let entry = CacheEntry::new(
            cache_id.clone(),
            request.question.clone(),
            request.answer.clone(),
            request.user_type.clone(),
        )
        .with_vector(vector)
        .with_metadata(entry_metadata(&request.metadata, quality_score))
        .with_created_at(chrono::Utc::now().timestamp());

        with_deadline("index", self.index_timeout, self.store.upsert(entry)).await?;

        info!(cache_id = %cache_id, quality_score, "entry stored");
        Ok(StoreOutcome::Stored { cache_id })
    }
}

/// Caller metadata minus reserved keys, plus the gate score.
fn entry_metadata(caller: &Payload, quality_score: f32) -> Payload {
    let mut metadata: Payload = caller
        .iter()
        .filter(|(k, _)| !RESERVED_PAYLOAD_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    metadata.insert(
        PAYLOAD_QUALITY_SCORE.to_string(),
        serde_json::Value::from(quality_score as f64),
    );
    metadata
}
