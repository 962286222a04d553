//! Review Scheduler: applies a graded answer to a word's review record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ciyu_db::{PracticeStore, models::ReviewRecord};
use ciyu_srs::{LearningState, Quality, schedule_review};

use crate::{context::LearnerScope, error::ApiError, metrics};

use super::ReviewStats;

/// Schedule the next review of `word_id` after an answer graded `quality`.
///
/// A word without a record starts from the `New` defaults. The updated record
/// is written back with exactly one upsert. Calling this twice with the same
/// input applies the grade twice.
pub async fn update_review(
    store: &dyn PracticeStore,
    scope: &LearnerScope,
    word_id: &str,
    quality: Quality,
    now: DateTime<Utc>,
) -> Result<ReviewRecord, ApiError> {
    let key = scope.review_key(word_id);

    let mut record = store
        .load_review_record(&key)
        .await
        .map_err(|e| ApiError::persistence("load_review_record", e))?
        .unwrap_or_else(|| ReviewRecord::new_word(key));

    let previous_state = record.learning_state;
    let scheduled = schedule_review(&record.state(), quality, now);
    record.apply(scheduled, quality, now);

    store
        .upsert_review_record(&record)
        .await
        .map_err(|e| ApiError::persistence("upsert_review_record", e))?;

    metrics::record_review(quality, record.learning_state);
    tracing::debug!(
        user_id = %scope.user_id,
        word_id,
        quality = quality.value(),
        from = %previous_state,
        to = %record.learning_state,
        interval_days = record.interval_days,
        "Review scheduled"
    );

    Ok(record)
}

/// Count a learner's review records by state.
pub async fn review_stats(
    store: &dyn PracticeStore,
    scope: &LearnerScope,
    now: DateTime<Utc>,
) -> Result<ReviewStats, ApiError> {
    let records = store
        .list_review_records(scope.user_id, scope.language, &scope.level)
        .await
        .map_err(|e| ApiError::persistence("list_review_records", e))?;

    let mut states: BTreeMap<String, usize> = LearningState::ALL
        .iter()
        .map(|state| (state.as_str().to_string(), 0))
        .collect();
    for record in &records {
        *states
            .entry(record.learning_state.as_str().to_string())
            .or_default() += 1;
    }

    Ok(ReviewStats {
        language: scope.language,
        level: scope.level.clone(),
        total: records.len(),
        states,
        due_now: records.iter().filter(|r| r.is_due(now)).count(),
    })
}
