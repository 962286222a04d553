use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use ciyu_db::models::{AnswerEvent, PracticeSession};
use uuid::Uuid;

use crate::{
    ApiState,
    error::ApiError,
    extract::ApiJson,
    validation::{
        parse_language, parse_response_time_ms, validate_exercise_type, validate_level,
        validate_word_id,
    },
};

use super::{
    AnswerSubmission, CompleteSessionRequest, NewSession, RecordAnswerRequest, SessionSummary,
    StartSessionRequest, SubmitAnswerResponse, complete_session, record_answer, session_summary,
    start_session, submit_answer,
};

/// Create the session routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/practice/{user_id}/sessions", post(create_session))
        .route(
            "/practice/{user_id}/sessions/{session_id}",
            get(get_session_summary),
        )
        .route(
            "/practice/{user_id}/sessions/{session_id}/events",
            post(create_answer_event),
        )
        .route(
            "/practice/{user_id}/sessions/{session_id}/answers",
            post(create_answer),
        )
        .route(
            "/practice/{user_id}/sessions/{session_id}/complete",
            post(finish_session),
        )
}

async fn create_session(
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
    ApiJson(payload): ApiJson<StartSessionRequest>,
) -> Result<(StatusCode, Json<PracticeSession>), ApiError> {
    validate_exercise_type(&payload.exercise_type)?;
    validate_level(&payload.level)?;
    let language = parse_language(&payload.language)?;

    let new = NewSession {
        exercise_type: payload.exercise_type,
        language,
        level: payload.level,
        requested_count: payload.requested_count,
        metadata: payload.metadata,
    };
    let session = start_session(state.store.as_ref(), user_id, new, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(session)))
}

async fn get_session_summary(
    State(state): State<ApiState>,
    Path((user_id, session_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SessionSummary>, ApiError> {
    let summary = session_summary(state.store.as_ref(), user_id, session_id).await?;
    Ok(Json(summary))
}

/// Strict append: every failure is reported to the caller.
async fn create_answer_event(
    State(state): State<ApiState>,
    Path((user_id, session_id)): Path<(Uuid, Uuid)>,
    ApiJson(payload): ApiJson<RecordAnswerRequest>,
) -> Result<StatusCode, ApiError> {
    validate_word_id(&payload.word_id)?;
    if let Some(exercise_type) = &payload.exercise_type {
        validate_exercise_type(exercise_type)?;
    }
    let response_time_ms = parse_response_time_ms(payload.response_time_ms)?;

    let event = AnswerEvent {
        word_id: payload.word_id,
        expected_answer: payload.expected_answer,
        user_answer: payload.user_answer,
        is_correct: payload.is_correct,
        response_time_ms,
        recorded_at: Utc::now(),
    };

    record_answer(
        state.store.as_ref(),
        user_id,
        session_id,
        &event,
        payload.exercise_type.as_deref(),
    )
    .await?;

    Ok(StatusCode::CREATED)
}

/// Best-effort path used by quiz pages for each question.
async fn create_answer(
    State(state): State<ApiState>,
    Path((user_id, session_id)): Path<(Uuid, Uuid)>,
    ApiJson(payload): ApiJson<AnswerSubmission>,
) -> Result<Json<SubmitAnswerResponse>, ApiError> {
    validate_word_id(&payload.word_id)?;

    let outcome =
        submit_answer(state.store.as_ref(), user_id, session_id, payload, Utc::now()).await?;

    Ok(Json(SubmitAnswerResponse {
        is_correct: outcome.is_correct,
        quality: outcome.quality,
        review: outcome.review,
        progress_saved: outcome.progress_saved,
    }))
}

async fn finish_session(
    State(state): State<ApiState>,
    Path((user_id, session_id)): Path<(Uuid, Uuid)>,
    ApiJson(payload): ApiJson<CompleteSessionRequest>,
) -> Result<Json<PracticeSession>, ApiError> {
    let session = complete_session(
        state.store.as_ref(),
        user_id,
        session_id,
        payload.correct_count,
        payload.duration_seconds,
        Utc::now(),
    )
    .await?;

    Ok(Json(session))
}
