use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use ciyu_srs::{LearningState, Quality, QueueItem, ReviewState, ScheduledReview};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Caller supplied key/value pairs attached to a session (e.g. `question_count`).
pub type SessionMetadata = BTreeMap<String, serde_json::Value>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported language '{0}' (expected 'mandarin' or 'cantonese')")]
pub struct UnknownLanguage(pub String);

/// Practice language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Mandarin,
    Cantonese,
}

impl Language {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mandarin => "mandarin",
            Self::Cantonese => "cantonese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mandarin" => Ok(Self::Mandarin),
            "cantonese" => Ok(Self::Cantonese),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = UnknownLanguage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Vocabulary item - owned by the content side, read-only here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    /// Unique within a language + level scope
    pub id: String,
    /// Display text (characters)
    pub headword: String,
    /// Romanization (pinyin / jyutping)
    pub phonetic: String,
    pub meaning: String,
    pub language: Language,
    /// Level tier (e.g. "hsk3", "so-cap")
    pub level: String,
}

impl QueueItem for VocabularyItem {
    fn word_id(&self) -> &str {
        &self.id
    }
}

/// Identifies one review record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewKey {
    pub user_id: Uuid,
    pub word_id: String,
    pub language: Language,
    pub level: String,
}

/// Per-learner, per-word review history.
///
/// One row per (user_id, word_id, language, level). Rows are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReviewRecord {
    pub user_id: Uuid,
    pub word_id: String,
    #[sqlx(try_from = "String")]
    pub language: Language,
    pub level: String,
    /// Consecutive successful reviews
    pub repetition_count: i32,
    pub ease_factor: f64,
    pub interval_days: i32,
    /// Failed reviews over the word's whole history
    pub lapse_count: i32,
    pub due_at: DateTime<Utc>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub last_quality: Option<i16>,
    #[sqlx(try_from = "String")]
    pub learning_state: LearningState,
}

impl ReviewRecord {
    /// The implicit record of a word that was never answered: `New`, and due
    /// since forever.
    pub fn new_word(key: ReviewKey) -> Self {
        let state = ReviewState::new_word();
        Self {
            user_id: key.user_id,
            word_id: key.word_id,
            language: key.language,
            level: key.level,
            repetition_count: state.repetition_count,
            ease_factor: state.ease_factor,
            interval_days: state.interval_days,
            lapse_count: state.lapse_count,
            due_at: DateTime::<Utc>::MIN_UTC,
            last_reviewed_at: None,
            last_quality: None,
            learning_state: state.learning_state,
        }
    }

    pub fn key(&self) -> ReviewKey {
        ReviewKey {
            user_id: self.user_id,
            word_id: self.word_id.clone(),
            language: self.language,
            level: self.level.clone(),
        }
    }

    pub const fn state(&self) -> ReviewState {
        ReviewState {
            repetition_count: self.repetition_count,
            ease_factor: self.ease_factor,
            interval_days: self.interval_days,
            lapse_count: self.lapse_count,
            learning_state: self.learning_state,
        }
    }

    /// Fold a scheduling outcome back into the record.
    pub fn apply(&mut self, scheduled: ScheduledReview, quality: Quality, now: DateTime<Utc>) {
        let state = scheduled.state;
        self.repetition_count = state.repetition_count;
        self.ease_factor = state.ease_factor;
        self.interval_days = state.interval_days;
        self.lapse_count = state.lapse_count;
        self.learning_state = state.learning_state;
        self.due_at = scheduled.due_at;
        self.last_reviewed_at = Some(now);
        self.last_quality = Some(i16::from(quality.value()));
    }

    pub fn is_due(&self, at: DateTime<Utc>) -> bool {
        self.due_at <= at
    }
}

/// Lifecycle of a practice session. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// One run of a quiz page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PracticeSession {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Quiz kind (e.g. "pinyin_choice", "pronunciation")
    pub exercise_type: String,
    #[sqlx(try_from = "String")]
    pub language: Language,
    pub level: String,
    pub requested_count: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Number of correct answers, set on completion
    pub score: Option<i32>,
    pub duration_seconds: Option<i32>,
    #[sqlx(json)]
    pub metadata: SessionMetadata,
}

impl PracticeSession {
    pub const fn status(&self) -> SessionStatus {
        if self.completed_at.is_some() {
            SessionStatus::Closed
        } else {
            SessionStatus::Open
        }
    }

    pub const fn is_open(&self) -> bool {
        matches!(self.status(), SessionStatus::Open)
    }
}

/// What the learner answered to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AnswerEvent {
    pub word_id: String,
    pub expected_answer: String,
    pub user_answer: String,
    pub is_correct: bool,
    pub response_time_ms: i64,
    pub recorded_at: DateTime<Utc>,
}

/// An [`AnswerEvent`] as stored: `sequence` reflects the order answers were
/// recorded in, even when timestamps collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RecordedAnswer {
    pub sequence: i64,
    pub session_id: Uuid,
    pub exercise_type: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub event: AnswerEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key() -> ReviewKey {
        ReviewKey {
            user_id: Uuid::nil(),
            word_id: "hsk1-0001".to_string(),
            language: Language::Mandarin,
            level: "hsk1".to_string(),
        }
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("mandarin".parse::<Language>().unwrap(), Language::Mandarin);
        assert_eq!("Cantonese".parse::<Language>().unwrap(), Language::Cantonese);
        assert!("klingon".parse::<Language>().is_err());
        assert_eq!(
            serde_json::to_string(&Language::Cantonese).unwrap(),
            "\"cantonese\""
        );
    }

    #[test]
    fn test_new_word_is_always_due() {
        let record = ReviewRecord::new_word(key());
        assert_eq!(record.learning_state, LearningState::New);
        assert!((record.ease_factor - 2.5).abs() < f64::EPSILON);
        assert!(record.is_due(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(record.key(), key());
    }

    #[test]
    fn test_apply_scheduled_review() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let mut record = ReviewRecord::new_word(key());
        let quality = Quality::new(5).unwrap();
        let scheduled = ciyu_srs::schedule_review(&record.state(), quality, now);

        record.apply(scheduled, quality, now);

        assert_eq!(record.repetition_count, 1);
        assert_eq!(record.interval_days, 1);
        assert_eq!(record.last_quality, Some(5));
        assert_eq!(record.last_reviewed_at, Some(now));
        assert_eq!(record.due_at, scheduled.due_at);
        assert_eq!(record.learning_state, LearningState::Review);
    }

    #[test]
    fn test_session_status() {
        let mut session = PracticeSession {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            exercise_type: "pinyin_choice".to_string(),
            language: Language::Mandarin,
            level: "hsk1".to_string(),
            requested_count: 10,
            started_at: Utc::now(),
            completed_at: None,
            score: None,
            duration_seconds: None,
            metadata: SessionMetadata::new(),
        };
        assert!(session.is_open());

        session.completed_at = Some(Utc::now());
        assert_eq!(session.status(), SessionStatus::Closed);
    }

    #[test]
    fn test_recorded_answer_serializes_flat() {
        let answer = RecordedAnswer {
            sequence: 3,
            session_id: Uuid::nil(),
            exercise_type: "pronunciation".to_string(),
            event: AnswerEvent {
                word_id: "w1".to_string(),
                expected_answer: "nǐ hǎo".to_string(),
                user_answer: "ni hao".to_string(),
                is_correct: true,
                response_time_ms: 1800,
                recorded_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            },
        };

        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["sequence"], 3);
        assert_eq!(json["word_id"], "w1");
        assert_eq!(json["is_correct"], true);
    }
}
