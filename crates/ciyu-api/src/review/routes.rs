use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::Utc;
use ciyu_db::models::ReviewRecord;
use ciyu_srs::Quality;
use uuid::Uuid;

use crate::{
    ApiState,
    context::LearnerScope,
    error::ApiError,
    extract::ApiJson,
    validation::{parse_language, validate_level, validate_word_id},
};

use super::{ReviewRequest, ReviewStats, review_stats, update_review};

/// Create the review routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/practice/{user_id}/reviews", post(submit_review))
        .route(
            "/practice/{user_id}/reviews/{language}/{level}",
            get(get_review_stats),
        )
}

async fn submit_review(
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
    ApiJson(payload): ApiJson<ReviewRequest>,
) -> Result<Json<ReviewRecord>, ApiError> {
    let language = parse_language(&payload.language)?;
    validate_level(&payload.level)?;
    validate_word_id(&payload.word_id)?;

    let quality = u8::try_from(payload.quality)
        .map_err(|_| ApiError::InvalidArgument(format!("Invalid quality: {}", payload.quality)))
        .and_then(|q| Quality::new(q).map_err(ApiError::from))?;

    let scope = LearnerScope::new(user_id, language, payload.level);
    let record = update_review(
        state.store.as_ref(),
        &scope,
        &payload.word_id,
        quality,
        Utc::now(),
    )
    .await?;

    Ok(Json(record))
}

async fn get_review_stats(
    State(state): State<ApiState>,
    Path((user_id, language, level)): Path<(Uuid, String, String)>,
) -> Result<Json<ReviewStats>, ApiError> {
    let language = parse_language(&language)?;
    validate_level(&level)?;

    let scope = LearnerScope::new(user_id, language, level);
    let stats = review_stats(state.store.as_ref(), &scope, Utc::now()).await?;

    Ok(Json(stats))
}
