use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{PracticeStore, StoreError};
use crate::models::{
    AnswerEvent, Language, PracticeSession, RecordedAnswer, ReviewKey, ReviewRecord,
};

#[derive(Debug, Default)]
struct Tables {
    reviews: HashMap<ReviewKey, ReviewRecord>,
    sessions: HashMap<Uuid, PracticeSession>,
    answers: HashMap<Uuid, Vec<RecordedAnswer>>,
    next_sequence: i64,
}

/// In-process [`PracticeStore`] used by tests and local runs without a database.
///
/// [`MemoryStore::set_offline`] makes every call fail with
/// [`StoreError::Unavailable`], which is how outages are simulated.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("memory store is offline"));
        }
        self.tables
            .lock()
            .map_err(|_| StoreError::unavailable("memory store lock poisoned"))
    }

    fn scoped_reviews(
        tables: &Tables,
        user_id: Uuid,
        language: Language,
        level: &str,
    ) -> Vec<ReviewRecord> {
        let mut records: Vec<ReviewRecord> = tables
            .reviews
            .values()
            .filter(|r| r.user_id == user_id && r.language == language && r.level == level)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.due_at
                .cmp(&b.due_at)
                .then_with(|| a.word_id.cmp(&b.word_id))
        });
        records
    }
}

#[async_trait]
impl PracticeStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.tables().map(|_| ())
    }

    async fn load_review_record(
        &self,
        key: &ReviewKey,
    ) -> Result<Option<ReviewRecord>, StoreError> {
        Ok(self.tables()?.reviews.get(key).cloned())
    }

    async fn upsert_review_record(&self, record: &ReviewRecord) -> Result<(), StoreError> {
        self.tables()?
            .reviews
            .insert(record.key(), record.clone());
        Ok(())
    }

    async fn list_due_review_records(
        &self,
        user_id: Uuid,
        language: Language,
        level: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        let tables = self.tables()?;
        let mut records = Self::scoped_reviews(&tables, user_id, language, level);
        records.retain(|r| r.is_due(before));
        Ok(records)
    }

    async fn list_review_records(
        &self,
        user_id: Uuid,
        language: Language,
        level: &str,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        let tables = self.tables()?;
        let mut records = Self::scoped_reviews(&tables, user_id, language, level);
        records.sort_by(|a, b| a.word_id.cmp(&b.word_id));
        Ok(records)
    }

    async fn create_session(&self, session: &PracticeSession) -> Result<Uuid, StoreError> {
        let mut tables = self.tables()?;
        tables.sessions.insert(session.id, session.clone());
        tables.answers.entry(session.id).or_default();
        Ok(session.id)
    }

    async fn load_session(&self, session_id: Uuid) -> Result<Option<PracticeSession>, StoreError> {
        Ok(self.tables()?.sessions.get(&session_id).cloned())
    }

    async fn append_answer_event(
        &self,
        session_id: Uuid,
        exercise_type: &str,
        event: &AnswerEvent,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        match tables.sessions.get(&session_id) {
            None => return Err(StoreError::NotFound),
            Some(session) if !session.is_open() => return Err(StoreError::SessionClosed),
            Some(_) => {}
        }

        tables.next_sequence += 1;
        let answer = RecordedAnswer {
            sequence: tables.next_sequence,
            session_id,
            exercise_type: exercise_type.to_string(),
            event: event.clone(),
        };
        tables.answers.entry(session_id).or_default().push(answer);
        Ok(())
    }

    async fn list_answer_events(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<RecordedAnswer>, StoreError> {
        Ok(self
            .tables()?
            .answers
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn close_session(
        &self,
        session_id: Uuid,
        score: i32,
        duration_seconds: i32,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let session = tables
            .sessions
            .get_mut(&session_id)
            .ok_or(StoreError::NotFound)?;
        if !session.is_open() {
            return Err(StoreError::SessionClosed);
        }

        session.completed_at = Some(completed_at);
        session.score = Some(score);
        session.duration_seconds = Some(duration_seconds);
        Ok(())
    }
}
