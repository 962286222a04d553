//! Queue Composer: picks which words a quiz asks next.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use ciyu_db::{PracticeStore, models::VocabularyItem};
use ciyu_srs::{DueWord, compose_queue, shuffle_pool};
use rand::Rng;

use crate::{context::LearnerScope, error::ApiError, metrics, validation::validate_word_id};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueOutcome {
    pub items: Vec<VocabularyItem>,
    pub degraded: bool,
}

struct ReviewHistory {
    due: Vec<DueWord>,
    reviewed: HashSet<String>,
}

/// Compose a quiz queue of at most `count` words from `pool`.
///
/// Due reviews come first, then never-seen words, then the rest, and the
/// result is shuffled. When review history can't be read the pool is shuffled
/// as if every word were new and the outcome is flagged `degraded`. Errors are
/// limited to bad input: a `count` of zero, or a pool word with an invalid id
/// or from another language or level than `scope`.
pub async fn get_mixed_vocabulary<R>(
    store: &dyn PracticeStore,
    scope: &LearnerScope,
    pool: Vec<VocabularyItem>,
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<QueueOutcome, ApiError>
where
    R: Rng + ?Sized,
{
    if count < 1 {
        return Err(ApiError::InvalidArgument(
            "Count must be at least 1".to_string(),
        ));
    }
    validate_pool(scope, &pool)?;

    match load_history(store, scope, now).await {
        Ok(history) => {
            let items = compose_queue(pool, &history.due, &history.reviewed, count, rng);
            tracing::debug!(
                user_id = %scope.user_id,
                language = %scope.language,
                level = %scope.level,
                due = history.due.len(),
                queued = items.len(),
                "Composed vocabulary queue"
            );
            Ok(QueueOutcome {
                items,
                degraded: false,
            })
        }
        Err(err) => {
            tracing::warn!(
                user_id = %scope.user_id,
                error = %err,
                "Review history unavailable, falling back to shuffled pool"
            );
            metrics::record_queue_fallback();
            Ok(QueueOutcome {
                items: shuffle_pool(pool, count, rng),
                degraded: true,
            })
        }
    }
}

fn validate_pool(scope: &LearnerScope, pool: &[VocabularyItem]) -> Result<(), ApiError> {
    for item in pool {
        validate_word_id(&item.id)?;
        if item.language != scope.language || item.level != scope.level {
            return Err(ApiError::InvalidArgument(format!(
                "Word '{}' is {}/{}, not {}/{}",
                item.id, item.language, item.level, scope.language, scope.level
            )));
        }
    }
    Ok(())
}

/// One gateway round-trip; the due set is derived from the full history.
async fn load_history(
    store: &dyn PracticeStore,
    scope: &LearnerScope,
    now: DateTime<Utc>,
) -> Result<ReviewHistory, ApiError> {
    let records = store
        .list_review_records(scope.user_id, scope.language, &scope.level)
        .await
        .map_err(|e| ApiError::persistence("list_review_records", e))?;

    let due = records
        .iter()
        .filter(|record| record.is_due(now))
        .map(|record| DueWord {
            word_id: record.word_id.clone(),
            due_at: record.due_at,
        })
        .collect();
    let reviewed = records.into_iter().map(|record| record.word_id).collect();

    Ok(ReviewHistory { due, reviewed })
}
