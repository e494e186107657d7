use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{
    PAYLOAD_ANSWER, PAYLOAD_CREATED_AT, PAYLOAD_QUESTION, PAYLOAD_SCORE, PAYLOAD_USER_TYPE,
};

/// Non-vector data stored alongside an entry.
pub type Payload = Map<String, Value>;

const PAYLOAD_STATISTICS: &str = "statistics";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryStatistics {
    pub hit_count: u64,
    pub like_count: u64,
    /// Unix seconds of the last hit, if any.
    pub last_hit_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A cached question/answer pair with its embedding.
pub struct CacheEntry {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub user_type: String,
    pub vector: Vec<f32>,
    /// Caller metadata plus pipeline fields such as `quality_score`.
    #[serde(default)]
    pub metadata: Payload,
    #[serde(default)]
    pub statistics: EntryStatistics,
    /// Unix seconds.
    pub created_at: i64,
}

impl CacheEntry {
    pub fn new(id: String, question: String, answer: String, user_type: String) -> Self {
        Self {
            id,
            question,
            answer,
            user_type,
            vector: Vec::new(),
            metadata: Payload::new(),
            statistics: EntryStatistics::default(),
            created_at: 0,
        }
    }

    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = vector;
        self
    }

    pub fn with_metadata(mut self, metadata: Payload) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    /// Flattens the entry into a backend payload.
    ///
    /// Metadata keys come first; the core fields are written last so metadata can
    /// never shadow them.
    pub fn to_payload(&self) -> Payload {
        let mut payload = self.metadata.clone();
        payload.insert(PAYLOAD_QUESTION.to_string(), self.question.clone().into());
        payload.insert(PAYLOAD_ANSWER.to_string(), self.answer.clone().into());
        payload.insert(PAYLOAD_USER_TYPE.to_string(), self.user_type.clone().into());
        payload.insert(PAYLOAD_CREATED_AT.to_string(), self.created_at.into());
        if let Ok(stats) = serde_json::to_value(&self.statistics) {
            payload.insert(PAYLOAD_STATISTICS.to_string(), stats);
        }
        payload
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One search hit.
pub struct SearchMatch {
    pub id: String,
    /// Raw backend score.
    pub score: f32,
    /// Entry payload; carries the score under `score` as well.
    pub payload: Payload,
}

impl SearchMatch {
    pub fn new(id: impl Into<String>, score: f32, mut payload: Payload) -> Self {
        payload.insert(PAYLOAD_SCORE.to_string(), Value::from(score as f64));
        Self {
            id: id.into(),
            score,
            payload,
        }
    }

    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Search restriction. `user_type` is an exact match.
pub struct SearchFilter {
    pub user_type: String,
}

impl SearchFilter {
    pub fn user_type(user_type: &str) -> Self {
        Self {
            user_type: user_type.to_string(),
        }
    }
}

/// Cosine similarity; `0.0` for empty, mismatched or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Brute-force ranking shared by the scan-based stores.
pub(crate) fn rank_entries<'a, I>(
    entries: I,
    query: &[f32],
    top_k: usize,
    score_threshold: f32,
    filter: &SearchFilter,
) -> Vec<SearchMatch>
where
    I: IntoIterator<Item = &'a CacheEntry>,
{
    let mut matches: Vec<SearchMatch> = entries
        .into_iter()
        .filter(|e| e.user_type == filter.user_type)
        .filter_map(|e| {
            let score = cosine_similarity(query, &e.vector);
            (score >= score_threshold).then(|| SearchMatch::new(e.id.clone(), score, e.to_payload()))
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(top_k);
    matches
}
