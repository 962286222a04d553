use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres, types::Json};
use uuid::Uuid;

use crate::models::{AnswerEvent, PracticeSession, RecordedAnswer};

pub async fn insert_session<'e, E>(
    executor: E,
    session: &PracticeSession,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO practice_sessions (
                id, user_id, exercise_type, language, level, requested_count, started_at, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
        "#,
    )
    .bind(session.id)
    .bind(session.user_id)
    .bind(&session.exercise_type)
    .bind(session.language.as_str())
    .bind(&session.level)
    .bind(session.requested_count)
    .bind(session.started_at)
    .bind(Json(&session.metadata))
    .fetch_one(executor)
    .await
}

pub async fn get_session<'e, E>(
    executor: E,
    session_id: Uuid,
) -> Result<Option<PracticeSession>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, user_id, exercise_type, language, level, requested_count, started_at,
                   completed_at, score, duration_seconds, metadata
            FROM practice_sessions
            WHERE id = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(executor)
    .await
}

/// Insert an answer event if the session exists and is still open.
///
/// Returns `false` when nothing was inserted.
pub async fn insert_answer_event<'e, E>(
    executor: E,
    session_id: Uuid,
    exercise_type: &str,
    event: &AnswerEvent,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO answer_events (
                session_id, exercise_type, word_id, expected_answer, user_answer,
                is_correct, response_time_ms, recorded_at
            )
            SELECT $1, $2, $3, $4, $5, $6, $7, $8
            FROM practice_sessions
            WHERE id = $1 AND completed_at IS NULL
        "#,
    )
    .bind(session_id)
    .bind(exercise_type)
    .bind(&event.word_id)
    .bind(&event.expected_answer)
    .bind(&event.user_answer)
    .bind(event.is_correct)
    .bind(event.response_time_ms)
    .bind(event.recorded_at)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_answer_events<'e, E>(
    executor: E,
    session_id: Uuid,
) -> Result<Vec<RecordedAnswer>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id AS sequence, session_id, exercise_type, word_id, expected_answer,
                   user_answer, is_correct, response_time_ms, recorded_at
            FROM answer_events
            WHERE session_id = $1
            ORDER BY id
        "#,
    )
    .bind(session_id)
    .fetch_all(executor)
    .await
}

/// Close a session that is still open.
///
/// Returns `false` when the session is unknown or was already closed.
pub async fn complete_session<'e, E>(
    executor: E,
    session_id: Uuid,
    score: i32,
    duration_seconds: i32,
    completed_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE practice_sessions
            SET completed_at = $4,
                score = $2,
                duration_seconds = $3
            WHERE id = $1 AND completed_at IS NULL
        "#,
    )
    .bind(session_id)
    .bind(score)
    .bind(duration_seconds)
    .bind(completed_at)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
