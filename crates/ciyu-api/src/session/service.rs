//! Session Recorder: the Open -> Closed lifecycle of a quiz run and its answers.

use chrono::{DateTime, Utc};
use ciyu_db::{
    PracticeStore, StoreError,
    models::{AnswerEvent, Language, PracticeSession, ReviewRecord, SessionMetadata},
};
use ciyu_srs::{Quality, calculate_quality};
use uuid::Uuid;

use crate::{
    context::LearnerScope, error::ApiError, metrics, normalization::answers_match,
    review::update_review, validation::parse_response_time_ms,
};

use super::{AnswerSubmission, SessionSummary};

/// Everything needed to open a session
#[derive(Debug, Clone)]
pub struct NewSession {
    pub exercise_type: String,
    pub language: Language,
    pub level: String,
    pub requested_count: i32,
    pub metadata: SessionMetadata,
}

/// Result of a best-effort answer submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub is_correct: bool,
    pub quality: Quality,
    pub review: Option<ReviewRecord>,
    pub progress_saved: bool,
}

/// Open a new session with `started_at = now`.
pub async fn start_session(
    store: &dyn PracticeStore,
    user_id: Uuid,
    new: NewSession,
    now: DateTime<Utc>,
) -> Result<PracticeSession, ApiError> {
    if new.requested_count < 0 {
        return Err(ApiError::InvalidArgument(format!(
            "Requested count cannot be negative, got {}",
            new.requested_count
        )));
    }

    let mut session = PracticeSession {
        id: Uuid::new_v4(),
        user_id,
        exercise_type: new.exercise_type,
        language: new.language,
        level: new.level,
        requested_count: new.requested_count,
        started_at: now,
        completed_at: None,
        score: None,
        duration_seconds: None,
        metadata: new.metadata,
    };

    session.id = store
        .create_session(&session)
        .await
        .map_err(|e| ApiError::persistence("create_session", e))?;

    metrics::record_session_event("started");
    tracing::info!(
        session_id = %session.id,
        %user_id,
        exercise_type = %session.exercise_type,
        "Session started"
    );

    Ok(session)
}

/// Append an answer to an open session.
///
/// `exercise_type` defaults to the session's own. Callers treat failures as
/// non-fatal to the quiz.
pub async fn record_answer(
    store: &dyn PracticeStore,
    user_id: Uuid,
    session_id: Uuid,
    event: &AnswerEvent,
    exercise_type: Option<&str>,
) -> Result<(), ApiError> {
    if event.response_time_ms < 0 {
        return Err(ApiError::InvalidArgument(format!(
            "Response time cannot be negative, got {}",
            event.response_time_ms
        )));
    }

    let session = load_owned_session(store, user_id, session_id, "load_session").await?;
    append_to_session(store, &session, event, exercise_type).await
}

/// Close an open session with its final score.
///
/// Only the first call lands; a second one fails with `SessionAlreadyClosed`
/// and leaves the first score in place.
pub async fn complete_session(
    store: &dyn PracticeStore,
    user_id: Uuid,
    session_id: Uuid,
    correct_count: i32,
    duration_seconds: i32,
    now: DateTime<Utc>,
) -> Result<PracticeSession, ApiError> {
    if correct_count < 0 || duration_seconds < 0 {
        return Err(ApiError::InvalidArgument(
            "Correct count and duration cannot be negative".to_string(),
        ));
    }

    let mut session = load_owned_session(store, user_id, session_id, "load_session").await?;
    if !session.is_open() {
        tracing::info!(%session_id, "Completion of an already closed session rejected");
        return Err(ApiError::SessionAlreadyClosed(session_id));
    }

    store
        .close_session(session_id, correct_count, duration_seconds, now)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::SessionNotFound(session_id),
            StoreError::SessionClosed => ApiError::SessionAlreadyClosed(session_id),
            other => ApiError::persistence("close_session", other),
        })?;

    session.completed_at = Some(now);
    session.score = Some(correct_count);
    session.duration_seconds = Some(duration_seconds);

    metrics::record_session_event("completed");
    tracing::info!(%session_id, score = correct_count, duration_seconds, "Session completed");

    Ok(session)
}

/// A session with its answers in recording order.
pub async fn session_summary(
    store: &dyn PracticeStore,
    user_id: Uuid,
    session_id: Uuid,
) -> Result<SessionSummary, ApiError> {
    let session = load_owned_session(store, user_id, session_id, "load_session").await?;
    let events = store
        .list_answer_events(session_id)
        .await
        .map_err(|e| ApiError::persistence("list_answer_events", e))?;

    Ok(SessionSummary::new(session, events))
}

/// Grade one answer, then update the word's review and record the answer.
///
/// Only invalid input or an unknown session fail the call. When either write
/// fails the grade is still returned with `progress_saved = false`.
pub async fn submit_answer(
    store: &dyn PracticeStore,
    user_id: Uuid,
    session_id: Uuid,
    submission: AnswerSubmission,
    now: DateTime<Utc>,
) -> Result<SubmitOutcome, ApiError> {
    let response_time_ms = parse_response_time_ms(submission.response_time_ms)?;
    let is_correct = submission
        .is_correct
        .unwrap_or_else(|| answers_match(&submission.expected_answer, &submission.user_answer));
    let quality = calculate_quality(is_correct, response_time_ms)?;
    let ungraded = SubmitOutcome {
        is_correct,
        quality,
        review: None,
        progress_saved: false,
    };

    let session = match load_owned_session(store, user_id, session_id, "load_session").await {
        Ok(session) => session,
        // Without the session there is no scope to review under.
        Err(err @ ApiError::SessionNotFound(_)) => return Err(err),
        Err(err) if err.is_recoverable() => return Ok(ungraded),
        Err(err) => return Err(err),
    };

    let scope = LearnerScope::new(user_id, session.language, session.level.clone());
    let review = match update_review(store, &scope, &submission.word_id, quality, now).await {
        Ok(record) => Some(record),
        Err(err) if err.is_recoverable() => {
            tracing::warn!(
                %session_id,
                word_id = %submission.word_id,
                error = %err,
                "Review not saved"
            );
            None
        }
        Err(err) => return Err(err),
    };

    let event = AnswerEvent {
        word_id: submission.word_id,
        expected_answer: submission.expected_answer,
        user_answer: submission.user_answer,
        is_correct,
        response_time_ms,
        recorded_at: now,
    };
    let recorded = match append_to_session(store, &session, &event, None).await {
        Ok(()) => true,
        Err(err) if err.is_recoverable() => {
            tracing::warn!(%session_id, error = %err, "Answer not recorded");
            false
        }
        Err(err) => return Err(err),
    };

    Ok(SubmitOutcome {
        progress_saved: review.is_some() && recorded,
        review,
        ..ungraded
    })
}

/// Load a session, hiding sessions owned by another user.
async fn load_owned_session(
    store: &dyn PracticeStore,
    user_id: Uuid,
    session_id: Uuid,
    operation: &'static str,
) -> Result<PracticeSession, ApiError> {
    match store.load_session(session_id).await {
        Ok(Some(session)) if session.user_id == user_id => Ok(session),
        Ok(_) | Err(StoreError::NotFound) => Err(ApiError::SessionNotFound(session_id)),
        Err(err) => Err(ApiError::persistence(operation, err)),
    }
}

async fn append_to_session(
    store: &dyn PracticeStore,
    session: &PracticeSession,
    event: &AnswerEvent,
    exercise_type: Option<&str>,
) -> Result<(), ApiError> {
    if !session.is_open() {
        tracing::debug!(session_id = %session.id, "Answer for a closed session rejected");
        return Err(ApiError::SessionNotOpen(session.id));
    }

    let exercise_type = exercise_type.unwrap_or(session.exercise_type.as_str());
    store
        .append_answer_event(session.id, exercise_type, event)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::SessionNotFound(session.id),
            StoreError::SessionClosed => ApiError::SessionNotOpen(session.id),
            other => ApiError::persistence("append_answer_event", other),
        })?;

    metrics::record_session_event("answer");
    Ok(())
}
