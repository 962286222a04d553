use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Language, ReviewKey, ReviewRecord};

pub async fn get_review_record<'e, E>(
    executor: E,
    key: &ReviewKey,
) -> Result<Option<ReviewRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, word_id, language, level, repetition_count, ease_factor,
                   interval_days, lapse_count, due_at, last_reviewed_at, last_quality,
                   learning_state
            FROM review_records
            WHERE user_id = $1 AND word_id = $2 AND language = $3 AND level = $4
        "#,
    )
    .bind(key.user_id)
    .bind(&key.word_id)
    .bind(key.language.as_str())
    .bind(&key.level)
    .fetch_optional(executor)
    .await
}

pub async fn upsert_review_record<'e, E>(
    executor: E,
    record: &ReviewRecord,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO review_records (
                user_id, word_id, language, level, repetition_count, ease_factor,
                interval_days, lapse_count, due_at, last_reviewed_at, last_quality,
                learning_state
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id, word_id, language, level)
            DO UPDATE SET
                repetition_count = $5,
                ease_factor = $6,
                interval_days = $7,
                lapse_count = $8,
                due_at = $9,
                last_reviewed_at = $10,
                last_quality = $11,
                learning_state = $12,
                updated_at = NOW()
        "#,
    )
    .bind(record.user_id)
    .bind(&record.word_id)
    .bind(record.language.as_str())
    .bind(&record.level)
    .bind(record.repetition_count)
    .bind(record.ease_factor)
    .bind(record.interval_days)
    .bind(record.lapse_count)
    .bind(record.due_at)
    .bind(record.last_reviewed_at)
    .bind(record.last_quality)
    .bind(record.learning_state.as_str())
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn list_due_review_records<'e, E>(
    executor: E,
    user_id: Uuid,
    language: Language,
    level: &str,
    before: DateTime<Utc>,
) -> Result<Vec<ReviewRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, word_id, language, level, repetition_count, ease_factor,
                   interval_days, lapse_count, due_at, last_reviewed_at, last_quality,
                   learning_state
            FROM review_records
            WHERE user_id = $1 AND language = $2 AND level = $3 AND due_at <= $4
            ORDER BY due_at, word_id
        "#,
    )
    .bind(user_id)
    .bind(language.as_str())
    .bind(level)
    .bind(before)
    .fetch_all(executor)
    .await
}

pub async fn list_review_records<'e, E>(
    executor: E,
    user_id: Uuid,
    language: Language,
    level: &str,
) -> Result<Vec<ReviewRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, word_id, language, level, repetition_count, ease_factor,
                   interval_days, lapse_count, due_at, last_reviewed_at, last_quality,
                   learning_state
            FROM review_records
            WHERE user_id = $1 AND language = $2 AND level = $3
            ORDER BY word_id
        "#,
    )
    .bind(user_id)
    .bind(language.as_str())
    .bind(level)
    .fetch_all(executor)
    .await
}
