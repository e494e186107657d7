use std::time::Duration;

use crate::constants::{DEFAULT_SCORE_THRESHOLD, DEFAULT_TOP_K, MAX_TOP_K};
use crate::normalize::NormalizeMode;
use crate::selector::ResultSelector;

use super::error::{PipelineError, PipelineResult};

pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RETRIEVE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub top_k: usize,
    pub score_threshold: f32,
    pub selector: ResultSelector,
    pub normalize_mode: NormalizeMode,
    pub embedding_timeout: Duration,
    pub retrieve_timeout: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            selector: ResultSelector::default(),
            normalize_mode: NormalizeMode::default(),
            embedding_timeout: DEFAULT_EMBEDDING_TIMEOUT,
            retrieve_timeout: DEFAULT_RETRIEVE_TIMEOUT,
        }
    }
}

impl QueryConfig {
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn selector(mut self, selector: ResultSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn normalize_mode(mut self, mode: NormalizeMode) -> Self {
        self.normalize_mode = mode;
        self
    }

    pub fn timeouts(mut self, embedding: Duration, retrieve: Duration) -> Self {
        self.embedding_timeout = embedding;
        self.retrieve_timeout = retrieve;
        self
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !(1..=MAX_TOP_K).contains(&self.top_k) {
            return Err(PipelineError::Validation(format!(
                "top_k must be between 1 and {}, got {}",
                MAX_TOP_K, self.top_k
            )));
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(PipelineError::Validation(format!(
                "score_threshold must be between 0 and 1, got {}",
                self.score_threshold
            )));
        }
        if self.embedding_timeout.is_zero() || self.retrieve_timeout.is_zero() {
            return Err(PipelineError::Validation(
                "timeouts must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
