use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Why a question/answer pair was refused by the gate.
pub enum RejectReason {
    QuestionTooShort,
    QuestionTooLong,
    AnswerTooShort,
    AnswerTooLong,
    Blacklisted,
    LowQuality,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::QuestionTooShort => "question too short",
            RejectReason::QuestionTooLong => "question too long",
            RejectReason::AnswerTooShort => "answer too short",
            RejectReason::AnswerTooLong => "answer too long",
            RejectReason::Blacklisted => "contains blacklisted content",
            RejectReason::LowQuality => "quality score below threshold",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RejectReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Result of [`QualityGate::check`](super::QualityGate::check).
///
/// `reason` is present iff `passed` is false.
pub struct QualityDecision {
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    pub score: f32,
}

impl QualityDecision {
    pub fn pass(score: f32) -> Self {
        Self {
            passed: true,
            reason: None,
            score,
        }
    }

    pub fn reject(reason: RejectReason, score: f32) -> Self {
        Self {
            passed: false,
            reason: Some(reason),
            score,
        }
    }

    /// Returns a short debug string.
    pub fn debug_status(&self) -> &'static str {
        match self.reason {
            None => "PASSED",
            Some(reason) => reason.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// One line of [`QualityGate::check_details`](super::QualityGate::check_details).
pub struct CheckDetail {
    pub name: &'static str,
    pub passed: bool,
    pub score: f32,
    pub message: String,
}

/// Two-way branch taken by the store pipeline after the gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateOutcome {
    Passed { score: f32 },
    Rejected { reason: RejectReason },
}

impl From<QualityDecision> for GateOutcome {
    fn from(decision: QualityDecision) -> Self {
        if decision.passed {
            GateOutcome::Passed {
                score: decision.score,
            }
        } else {
            GateOutcome::Rejected {
                reason: decision.reason.unwrap_or(RejectReason::LowQuality),
            }
        }
    }
}
