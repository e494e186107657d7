use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(alias = "cache_ids")]
    pub ids: Vec<String>,
    pub user_type: String,
    #[serde(default)]
    pub force: bool,
}

impl DeleteRequest {
    pub fn new<I, S>(ids: I, user_type: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            user_type: user_type.into(),
            force: false,
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Outcome of a delete. Partial failure is reported here, not as an error.
///
/// `success` is true iff `failed_ids` is empty.
pub struct DeleteResult {
    pub success: bool,
    pub deleted_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DeleteResult {
    pub fn empty() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// Every id failed for the same reason.
    pub fn all_failed(ids: &[String], reason: String) -> Self {
        Self {
            success: false,
            deleted_count: 0,
            failed_ids: ids.to_vec(),
            reason: Some(reason),
        }
    }

    pub(crate) fn from_parts(deleted_count: usize, failed_ids: Vec<String>, reason: Option<String>) -> Self {
        Self {
            success: failed_ids.is_empty(),
            deleted_count,
            failed_ids,
            reason,
        }
    }
}
