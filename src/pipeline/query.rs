use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::constants::{
    PAYLOAD_ANSWER, PAYLOAD_QUESTION, PAYLOAD_SCORE, PAYLOAD_SCORE_FALLBACK, clamp_similarity,
};
use crate::embedding::Embedder;
use crate::selector::candidate_score;
use crate::vectordb::{SearchFilter, SearchMatch, VectorStore};

use super::config::QueryConfig;
use super::error::{PipelineError, PipelineResult};
use super::types::{QueryHit, QueryOutcome, QueryRequest};
use super::with_deadline;

/// normalize → embed → search → select → format.
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    config: QueryConfig,
}

impl std::fmt::Debug for QueryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryPipeline")
            .field("backend", &self.store.backend_name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QueryPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: QueryConfig,
    ) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            embedder,
            store,
            config,
        })
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Looks up a cached answer for `request.question` within its `user_type`.
    ///
    /// Returns [`QueryOutcome::Miss`] when nothing clears the threshold. Embedding
    /// and search failures are errors; no later stage runs after one.
    #[instrument(
        skip(self, request),
        fields(user_type = %request.user_type, question_len = request.question.len())
    )]
    pub async fn query(&self, request: &QueryRequest) -> PipelineResult<QueryOutcome> {
        request.validate()?;

        let question = self.config.normalize_mode.apply(&request.question);
        if question.is_empty() {
            return Err(PipelineError::Validation(
                "question is empty after normalization".to_string(),
            ));
        }

        let vector = with_deadline(
            "embedding",
            self.config.embedding_timeout,
            self.embedder.embed(&question),
        )
        .await?;
        debug!(embedding_dim = vector.len(), "question embedded");

        let top_k = request.top_k.unwrap_or(self.config.top_k);
        let score_threshold = request
            .score_threshold
            .unwrap_or(self.config.score_threshold);
        let filter = SearchFilter::user_type(&request.user_type);

        let candidates = with_deadline(
            "retrieve",
            self.config.retrieve_timeout,
            self.store.search(&vector, top_k, score_threshold, &filter),
        )
        .await?;
        debug!(candidates = candidates.len(), top_k, score_threshold, "search complete");

        let Some(selected) = self.config.selector.select(&candidates) else {
            info!(candidates = 0, "cache miss");
            return Ok(QueryOutcome::Miss);
        };

        let hit = format_hit(selected);
        info!(
            cache_id = %hit.cache_id,
            score = hit.score,
            candidates = candidates.len(),
            strategy = self.config.selector.strategy().name(),
            "cache hit"
        );
        Ok(QueryOutcome::Hit(hit))
    }
}

fn format_hit(selected: &SearchMatch) -> QueryHit {
    let text = |key: &str| {
        selected
            .payload_str(key)
            .map(str::to_string)
            .unwrap_or_default()
    };

    let mut metadata = selected.payload.clone();
    for key in [
        PAYLOAD_QUESTION,
        PAYLOAD_ANSWER,
        PAYLOAD_SCORE,
        PAYLOAD_SCORE_FALLBACK,
    ] {
        metadata.remove(key);
    }

    QueryHit {
        cache_id: selected.id.clone(),
        question: text(PAYLOAD_QUESTION),
        answer: text(PAYLOAD_ANSWER),
        score: clamp_similarity(candidate_score(selected)),
        metadata,
    }
}
