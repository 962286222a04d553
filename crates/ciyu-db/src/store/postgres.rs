use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{PracticeStore, StoreError};
use crate::{
    models::{AnswerEvent, Language, PracticeSession, RecordedAnswer, ReviewKey, ReviewRecord},
    repositories::{review, session},
};

/// [`PracticeStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Tell "unknown session" from "already closed" after a guarded write
    /// touched no row.
    async fn missing_or_closed(&self, session_id: Uuid) -> StoreError {
        let err = match session::get_session(&self.pool, session_id).await {
            Ok(Some(_)) => StoreError::SessionClosed,
            Ok(None) => StoreError::NotFound,
            Err(e) => e.into(),
        };
        tracing::debug!(%session_id, error = %err, "Guarded session write touched no row");
        err
    }
}

#[async_trait]
impl PracticeStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn load_review_record(
        &self,
        key: &ReviewKey,
    ) -> Result<Option<ReviewRecord>, StoreError> {
        Ok(review::get_review_record(&self.pool, key).await?)
    }

    async fn upsert_review_record(&self, record: &ReviewRecord) -> Result<(), StoreError> {
        Ok(review::upsert_review_record(&self.pool, record).await?)
    }

    async fn list_due_review_records(
        &self,
        user_id: Uuid,
        language: Language,
        level: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        Ok(review::list_due_review_records(&self.pool, user_id, language, level, before).await?)
    }

    async fn list_review_records(
        &self,
        user_id: Uuid,
        language: Language,
        level: &str,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        Ok(review::list_review_records(&self.pool, user_id, language, level).await?)
    }

    async fn create_session(&self, practice_session: &PracticeSession) -> Result<Uuid, StoreError> {
        Ok(session::insert_session(&self.pool, practice_session).await?)
    }

    async fn load_session(&self, session_id: Uuid) -> Result<Option<PracticeSession>, StoreError> {
        Ok(session::get_session(&self.pool, session_id).await?)
    }

    async fn append_answer_event(
        &self,
        session_id: Uuid,
        exercise_type: &str,
        event: &AnswerEvent,
    ) -> Result<(), StoreError> {
        if session::insert_answer_event(&self.pool, session_id, exercise_type, event).await? {
            Ok(())
        } else {
            Err(self.missing_or_closed(session_id).await)
        }
    }

    async fn list_answer_events(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<RecordedAnswer>, StoreError> {
        Ok(session::list_answer_events(&self.pool, session_id).await?)
    }

    async fn close_session(
        &self,
        session_id: Uuid,
        score: i32,
        duration_seconds: i32,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if session::complete_session(&self.pool, session_id, score, duration_seconds, completed_at)
            .await?
        {
            Ok(())
        } else {
            Err(self.missing_or_closed(session_id).await)
        }
    }
}
