//! Persistence gateway.
//!
//! Everything above this module works on in-memory records and goes through
//! [`PracticeStore`] to load and save them. Implementations must keep "not found"
//! and "storage unreachable" apart so callers can degrade gracefully.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AnswerEvent, Language, PracticeSession, RecordedAnswer, ReviewKey, ReviewRecord,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,
    #[error("Session is already closed")]
    SessionClosed,
    #[error("Storage unavailable: {0}")]
    Unavailable(#[source] BoxError),
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        Self::Unavailable(reason.into())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Unavailable(Box::new(other)),
        }
    }
}

#[async_trait]
pub trait PracticeStore: Send + Sync {
    /// Readiness check.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn load_review_record(&self, key: &ReviewKey)
    -> Result<Option<ReviewRecord>, StoreError>;

    /// Create or overwrite the record for its key (last write wins).
    async fn upsert_review_record(&self, record: &ReviewRecord) -> Result<(), StoreError>;

    /// Records for the scope with `due_at <= before`, most overdue first.
    async fn list_due_review_records(
        &self,
        user_id: Uuid,
        language: Language,
        level: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<ReviewRecord>, StoreError>;

    /// Every record for the scope, due or not.
    async fn list_review_records(
        &self,
        user_id: Uuid,
        language: Language,
        level: &str,
    ) -> Result<Vec<ReviewRecord>, StoreError>;

    async fn create_session(&self, session: &PracticeSession) -> Result<Uuid, StoreError>;

    async fn load_session(&self, session_id: Uuid) -> Result<Option<PracticeSession>, StoreError>;

    /// Append to an open session. `NotFound` for an unknown session,
    /// `SessionClosed` once it is completed.
    async fn append_answer_event(
        &self,
        session_id: Uuid,
        exercise_type: &str,
        event: &AnswerEvent,
    ) -> Result<(), StoreError>;

    /// Events in the order they were appended.
    async fn list_answer_events(&self, session_id: Uuid)
    -> Result<Vec<RecordedAnswer>, StoreError>;

    /// Close an open session. Only the first call lands; later calls get
    /// `SessionClosed`.
    async fn close_session(
        &self,
        session_id: Uuid,
        score: i32,
        duration_seconds: i32,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}
