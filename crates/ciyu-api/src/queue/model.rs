use ciyu_db::models::VocabularyItem;
use serde::{Deserialize, Serialize};

/// Body of `POST /practice/{user_id}/queue`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueRequest {
    pub language: String,
    pub level: String,
    /// Queue length, server default when absent
    #[serde(default)]
    pub count: Option<i64>,
    /// Candidate words for the quiz, in the content side's order
    pub pool: Vec<VocabularyItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueResponse {
    pub items: Vec<VocabularyItem>,
    /// Review history could not be read; items are a plain shuffle of the pool
    pub degraded: bool,
}
