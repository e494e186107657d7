use super::error::{QualityError, QualityResult};

pub const DEFAULT_MIN_QUESTION_LEN: usize = 5;
pub const DEFAULT_MAX_QUESTION_LEN: usize = 10_000;
pub const DEFAULT_MIN_ANSWER_LEN: usize = 10;
pub const DEFAULT_MAX_ANSWER_LEN: usize = 100_000;
pub const DEFAULT_QUALITY_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
/// Thresholds for [`QualityGate`](super::QualityGate).
///
/// Lengths are counted in chars after trimming. A max of `0` means "no upper bound".
pub struct QualityConfig {
    pub enabled: bool,
    pub min_question_len: usize,
    pub max_question_len: usize,
    pub min_answer_len: usize,
    pub max_answer_len: usize,
    pub score_threshold: f32,
    pub blacklist: Vec<String>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_question_len: DEFAULT_MIN_QUESTION_LEN,
            max_question_len: DEFAULT_MAX_QUESTION_LEN,
            min_answer_len: DEFAULT_MIN_ANSWER_LEN,
            max_answer_len: DEFAULT_MAX_ANSWER_LEN,
            score_threshold: DEFAULT_QUALITY_THRESHOLD,
            blacklist: Vec::new(),
        }
    }
}

impl QualityConfig {
    /// A config that lets everything through.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn question_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_question_len = min;
        self.max_question_len = max;
        self
    }

    pub fn answer_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_answer_len = min;
        self.max_answer_len = max;
        self
    }

    pub fn score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn blacklist<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> QualityResult<()> {
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(QualityError::InvalidThreshold {
                value: self.score_threshold,
            });
        }
        if self.max_question_len > 0 && self.max_question_len < self.min_question_len {
            return Err(QualityError::InvalidBounds {
                field: "question",
                min: self.min_question_len,
                max: self.max_question_len,
            });
        }
        if self.max_answer_len > 0 && self.max_answer_len < self.min_answer_len {
            return Err(QualityError::InvalidBounds {
                field: "answer",
                min: self.min_answer_len,
                max: self.max_answer_len,
            });
        }
        Ok(())
    }
}
