//! Quality gate applied to question/answer pairs before they enter the cache.
//!
//! [`QualityGate::check`] runs length bounds, blacklist and a heuristic score, in that
//! order, stopping at the first failure. A disabled gate or a forced write always passes.

pub mod config;
pub mod error;
pub mod types;


pub use config::{
    DEFAULT_MAX_ANSWER_LEN, DEFAULT_MAX_QUESTION_LEN, DEFAULT_MIN_ANSWER_LEN,
    DEFAULT_MIN_QUESTION_LEN, DEFAULT_QUALITY_THRESHOLD, QualityConfig,
};
pub use error::{QualityError, QualityResult};
pub use types::{CheckDetail, GateOutcome, QualityDecision, RejectReason};

use tracing::debug;

const SHORT_QUESTION_CHARS: usize = 10;
const LONG_QUESTION_CHARS: usize = 500;
const SHORT_ANSWER_CHARS: usize = 50;
const LONG_ANSWER_CHARS: usize = 5000;

#[derive(Debug, Clone)]
/// Accept/reject check for cache writes.
pub struct QualityGate {
    config: QualityConfig,
    blacklist_lower: Vec<String>,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(QualityConfig::default())
    }
}

impl QualityGate {
    pub fn new(config: QualityConfig) -> Self {
        let blacklist_lower = config
            .blacklist
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        Self {
            config,
            blacklist_lower,
        }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Decides whether a question/answer pair may be cached.
    pub fn check(
        &self,
        question: &str,
        answer: &str,
        user_type: &str,
        force_write: bool,
    ) -> QualityDecision {
        if !self.config.enabled || force_write {
            return QualityDecision::pass(1.0);
        }

        let question = question.trim();
        let answer = answer.trim();
        let q_len = question.chars().count();
        let a_len = answer.chars().count();

        if let Some(reason) = self.length_violation(q_len, a_len) {
            debug!(user_type, q_len, a_len, reason = %reason, "quality gate rejected on length");
            return QualityDecision::reject(reason, 0.0);
        }

        if self.is_blacklisted(question) || self.is_blacklisted(answer) {
            debug!(user_type, "quality gate rejected on blacklist");
            return QualityDecision::reject(RejectReason::Blacklisted, 0.0);
        }

        let score = heuristic_score(question, q_len, a_len);
        if score < self.config.score_threshold {
            debug!(
                user_type,
                score,
                threshold = self.config.score_threshold,
                "quality gate rejected on score"
            );
            return QualityDecision::reject(RejectReason::LowQuality, score);
        }

        QualityDecision::pass(score)
    }

    /// Evaluates every check without short-circuiting. Diagnostic only.
    pub fn check_details(&self, question: &str, answer: &str) -> Vec<CheckDetail> {
        let question = question.trim();
        let answer = answer.trim();
        let q_len = question.chars().count();
        let a_len = answer.chars().count();

        let question_len = bounds_detail(
            "question_length",
            q_len,
            self.config.min_question_len,
            self.config.max_question_len,
        );
        let answer_len = bounds_detail(
            "answer_length",
            a_len,
            self.config.min_answer_len,
            self.config.max_answer_len,
        );

        let question_lower = question.to_lowercase();
        let answer_lower = answer.to_lowercase();
        let hit = self.blacklist_lower.iter().find(|w| {
            question_lower.contains(w.as_str()) || answer_lower.contains(w.as_str())
        });
        let blacklist = CheckDetail {
            name: "blacklist",
            passed: hit.is_none(),
            score: if hit.is_none() { 1.0 } else { 0.0 },
            message: match hit {
                Some(word) => format!("matched blacklisted keyword '{}'", word),
                None => "no blacklisted content".to_string(),
            },
        };

        let score = heuristic_score(question, q_len, a_len);
        let heuristic = CheckDetail {
            name: "heuristic",
            passed: score >= self.config.score_threshold,
            score,
            message: format!(
                "score {:.2} against threshold {:.2}",
                score, self.config.score_threshold
            ),
        };

        vec![question_len, answer_len, blacklist, heuristic]
    }

    fn length_violation(&self, q_len: usize, a_len: usize) -> Option<RejectReason> {
        let c = &self.config;
        if q_len < c.min_question_len {
            return Some(RejectReason::QuestionTooShort);
        }
        if c.max_question_len > 0 && q_len > c.max_question_len {
            return Some(RejectReason::QuestionTooLong);
        }
        if a_len < c.min_answer_len {
            return Some(RejectReason::AnswerTooShort);
        }
        if c.max_answer_len > 0 && a_len > c.max_answer_len {
            return Some(RejectReason::AnswerTooLong);
        }
        None
    }

    fn is_blacklisted(&self, text: &str) -> bool {
        if self.blacklist_lower.is_empty() {
            return false;
        }
        let lower = text.to_lowercase();
        self.blacklist_lower.iter().any(|w| lower.contains(w.as_str()))
    }
}

/// Heuristic quality in `[0, 1]`, computed in tenths so thresholds compare exactly.
fn heuristic_score(question: &str, q_len: usize, a_len: usize) -> f32 {
    let mut penalty: u32 = 0;

    if q_len < SHORT_QUESTION_CHARS {
        penalty += 2;
    } else if q_len > LONG_QUESTION_CHARS {
        penalty += 1;
    }

    if a_len < SHORT_ANSWER_CHARS {
        penalty += 2;
    } else if a_len > LONG_ANSWER_CHARS {
        penalty += 1;
    }

    if !question.contains(['?', '？']) {
        penalty += 1;
    }

    10u32.saturating_sub(penalty) as f32 / 10.0
}

fn bounds_detail(name: &'static str, len: usize, min: usize, max: usize) -> CheckDetail {
    let (passed, message) = if len < min {
        (false, format!("length {} is below minimum {}", len, min))
    } else if max > 0 && len > max {
        (false, format!("length {} exceeds maximum {}", len, max))
    } else {
        (true, format!("length {} within bounds", len))
    };

    CheckDetail {
        name,
        passed,
        score: if passed { 1.0 } else { 0.0 },
        message,
    }
}
