use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_ANSWER_CHARS, MAX_QUESTION_CHARS, MAX_TOP_K};
use crate::quality::RejectReason;
use crate::vectordb::Payload;

use super::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// A cache lookup.
pub struct QueryRequest {
    pub question: String,
    pub user_type: String,
    /// Overrides the configured `top_k`. Must be in `[1, 100]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    /// Overrides the configured threshold. Must be in `[0, 1]`.
    #[serde(
        default,
        alias = "similarity_threshold",
        skip_serializing_if = "Option::is_none"
    )]
    pub score_threshold: Option<f32>,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>, user_type: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            user_type: user_type.into(),
            top_k: None,
            score_threshold: None,
        }
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.question.trim().is_empty() {
            return Err(PipelineError::Validation("question is required".to_string()));
        }
        if self.user_type.trim().is_empty() {
            return Err(PipelineError::Validation("user_type is required".to_string()));
        }
        if let Some(top_k) = self.top_k {
            if !(1..=MAX_TOP_K).contains(&top_k) {
                return Err(PipelineError::Validation(format!(
                    "top_k must be between 1 and {}, got {}",
                    MAX_TOP_K, top_k
                )));
            }
        }
        if let Some(threshold) = self.score_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(PipelineError::Validation(format!(
                    "score_threshold must be between 0 and 1, got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub cache_id: String,
    pub question: String,
    pub answer: String,
    /// Similarity in `[0, MAX_SIMILARITY_SCORE]`.
    pub score: f32,
    /// Payload without the core fields.
    pub metadata: Payload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Miss,
    Hit(QueryHit),
}

impl QueryOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, QueryOutcome::Hit(_))
    }

    pub fn hit(&self) -> Option<&QueryHit> {
        match self {
            QueryOutcome::Hit(hit) => Some(hit),
            QueryOutcome::Miss => None,
        }
    }
}

/// Serialized flat: `{"hit": false}` or `{"hit": true, "cache_id": .., ..}`.
impl Serialize for QueryOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QueryOutcome::Miss => {
                let mut s = serializer.serialize_struct("QueryOutcome", 1)?;
                s.serialize_field("hit", &false)?;
                s.end()
            }
            QueryOutcome::Hit(hit) => {
                let mut s = serializer.serialize_struct("QueryOutcome", 6)?;
                s.serialize_field("hit", &true)?;
                s.serialize_field("cache_id", &hit.cache_id)?;
                s.serialize_field("question", &hit.question)?;
                s.serialize_field("answer", &hit.answer)?;
                s.serialize_field("score", &hit.score)?;
                s.serialize_field("metadata", &hit.metadata)?;
                s.end()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// A request to cache a question/answer pair.
pub struct WriteRequest {
    pub question: String,
    pub answer: String,
    pub user_type: String,
    #[serde(default)]
    pub metadata: Payload,
    /// Skips the quality gate.
    #[serde(default)]
    pub force_write: bool,
}

impl WriteRequest {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        user_type: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            user_type: user_type.into(),
            metadata: Payload::new(),
            force_write: false,
        }
    }

    pub fn metadata(mut self, metadata: Payload) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn force_write(mut self, force: bool) -> Self {
        self.force_write = force;
        self
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.question.trim().is_empty() {
            return Err(PipelineError::Validation("question is required".to_string()));
        }
        if self.answer.trim().is_empty() {
            return Err(PipelineError::Validation("answer is required".to_string()));
        }
        if self.user_type.trim().is_empty() {
            return Err(PipelineError::Validation("user_type is required".to_string()));
        }
        let q_len = self.question.chars().count();
        if q_len > MAX_QUESTION_CHARS {
            return Err(PipelineError::Validation(format!(
                "question exceeds {} characters ({})",
                MAX_QUESTION_CHARS, q_len
            )));
        }
        let a_len = self.answer.chars().count();
        if a_len > MAX_ANSWER_CHARS {
            return Err(PipelineError::Validation(format!(
                "answer exceeds {} characters ({})",
                MAX_ANSWER_CHARS, a_len
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreOutcome {
    /// Refused by the quality gate; nothing was embedded or written.
    Rejected { reason: RejectReason },
    Stored { cache_id: String },
}

impl StoreOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, StoreOutcome::Stored { .. })
    }

    pub fn cache_id(&self) -> Option<&str> {
        match self {
            StoreOutcome::Stored { cache_id } => Some(cache_id),
            StoreOutcome::Rejected { .. } => None,
        }
    }
}

/// Serialized as `{success, rejected, reason?, cache_id?}`.
impl Serialize for StoreOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("StoreOutcome", 3)?;
        match self {
            StoreOutcome::Rejected { reason } => {
                s.serialize_field("success", &false)?;
                s.serialize_field("rejected", &true)?;
                s.serialize_field("reason", reason)?;
            }
            StoreOutcome::Stored { cache_id } => {
                s.serialize_field("success", &true)?;
                s.serialize_field("rejected", &false)?;
                s.serialize_field("cache_id", cache_id)?;
            }
        }
        s.end()
    }
}
