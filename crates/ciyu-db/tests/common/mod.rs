use chrono::{DateTime, Duration, TimeZone, Utc};
use ciyu_db::{
    PgStore,
    models::{AnswerEvent, Language, PracticeSession, ReviewKey, ReviewRecord, SessionMetadata},
};
use uuid::Uuid;

/// Connect and migrate, or `None` when no test database is configured
pub async fn pg_store() -> Option<PgStore> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping PostgreSQL gateway test");
        return None;
    };

    let pool = ciyu_db::create_pool(&database_url, 5)
        .await
        .expect("Failed to connect to test database");
    ciyu_db::ensure_db_and_migrate(&database_url, &pool)
        .await
        .expect("Failed to migrate test database");

    Some(PgStore::new(pool))
}

/// Whole-second timestamp, so values survive the round-trip through TIMESTAMPTZ
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

pub fn record(user_id: Uuid, word_id: &str, due_at: DateTime<Utc>) -> ReviewRecord {
    let key = ReviewKey {
        user_id,
        word_id: word_id.to_string(),
        language: Language::Mandarin,
        level: "hsk2".to_string(),
    };
    ReviewRecord {
        due_at,
        ..ReviewRecord::new_word(key)
    }
}

pub fn session(user_id: Uuid) -> PracticeSession {
    PracticeSession {
        id: Uuid::new_v4(),
        user_id,
        exercise_type: "pinyin_choice".to_string(),
        language: Language::Mandarin,
        level: "hsk2".to_string(),
        requested_count: 5,
        started_at: base_time(),
        completed_at: None,
        score: None,
        duration_seconds: None,
        metadata: SessionMetadata::new(),
    }
}

pub fn answer(word_id: &str, offset_seconds: i64) -> AnswerEvent {
    AnswerEvent {
        word_id: word_id.to_string(),
        expected_answer: "xuéxí".to_string(),
        user_answer: "xuexi".to_string(),
        is_correct: true,
        response_time_ms: 1200,
        recorded_at: base_time() + Duration::seconds(offset_seconds),
    }
}
