use ciyu_db::models::{
    PracticeSession, RecordedAnswer, ReviewRecord, SessionMetadata, SessionStatus,
};
use ciyu_srs::Quality;
use serde::{Deserialize, Serialize};

/// Body of `POST /practice/{user_id}/sessions`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StartSessionRequest {
    pub exercise_type: String,
    pub language: String,
    pub level: String,
    #[serde(default)]
    pub requested_count: i32,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

/// Body of `POST .../sessions/{session_id}/events`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordAnswerRequest {
    pub word_id: String,
    pub expected_answer: String,
    pub user_answer: String,
    pub is_correct: bool,
    /// Milliseconds, fractions allowed
    pub response_time_ms: f64,
    /// Defaults to the session's exercise type
    #[serde(default)]
    pub exercise_type: Option<String>,
}

/// Body of `POST .../sessions/{session_id}/answers`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnswerSubmission {
    pub word_id: String,
    pub expected_answer: String,
    pub user_answer: String,
    /// Grade decided by the quiz page; compared server-side when absent
    #[serde(default)]
    pub is_correct: Option<bool>,
    /// Milliseconds, fractions allowed
    pub response_time_ms: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitAnswerResponse {
    pub is_correct: bool,
    pub quality: Quality,
    pub review: Option<ReviewRecord>,
    /// Whether both the review update and the answer event were stored
    pub progress_saved: bool,
}

/// Body of `POST .../sessions/{session_id}/complete`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompleteSessionRequest {
    pub correct_count: i32,
    pub duration_seconds: i32,
}

/// A session with its recorded answers and derived figures
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionSummary {
    #[serde(flatten)]
    pub session: PracticeSession,
    pub status: SessionStatus,
    pub answered: usize,
    pub correct: usize,
    /// `correct / answered`, 0 when nothing was answered
    pub accuracy: f64,
    pub average_response_time_ms: Option<f64>,
    pub events: Vec<RecordedAnswer>,
}

impl SessionSummary {
    pub fn new(session: PracticeSession, events: Vec<RecordedAnswer>) -> Self {
        let answered = events.len();
        let correct = events.iter().filter(|e| e.event.is_correct).count();
        let accuracy = if answered == 0 {
            0.0
        } else {
            correct as f64 / answered as f64
        };
        let average_response_time_ms = (answered > 0).then(|| {
            events
                .iter()
                .map(|e| e.event.response_time_ms as f64)
                .sum::<f64>()
                / answered as f64
        });

        Self {
            status: session.status(),
            session,
            answered,
            correct,
            accuracy,
            average_response_time_ms,
            events,
        }
    }
}
