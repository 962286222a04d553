use std::collections::BTreeMap;

use ciyu_db::models::Language;
use serde::{Deserialize, Serialize};

/// Body of `POST /practice/{user_id}/reviews`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewRequest {
    pub word_id: String,
    pub language: String,
    pub level: String,
    /// 0-5; kept wide so out-of-range values are reported as invalid input
    /// rather than a deserialization failure
    pub quality: i64,
}

/// Review progress for one (user, language, level)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReviewStats {
    pub language: Language,
    pub level: String,
    pub total: usize,
    /// Record count per learning state, every state present
    pub states: BTreeMap<String, usize>,
    /// Records whose `due_at` has passed
    pub due_now: usize,
}
