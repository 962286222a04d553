use ciyu_db::models::{Language, ReviewKey};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is practising what. Passed explicitly to every practice operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerScope {
    pub user_id: Uuid,
    pub language: Language,
    pub level: String,
}

impl LearnerScope {
    pub fn new(user_id: Uuid, language: Language, level: impl Into<String>) -> Self {
        Self {
            user_id,
            language,
            level: level.into(),
        }
    }

    /// Key of the review record for `word_id` within this scope.
    pub fn review_key(&self, word_id: &str) -> ReviewKey {
        ReviewKey {
            user_id: self.user_id,
            word_id: word_id.to_string(),
            language: self.language,
            level: self.level.clone(),
        }
    }
}
