use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use uuid::Uuid;

use crate::{
    ApiState,
    context::LearnerScope,
    error::ApiError,
    extract::ApiJson,
    validation::{parse_language, validate_level, validate_queue_count},
};

use super::{QueueRequest, QueueResponse, service::get_mixed_vocabulary};

/// Create the queue routes
pub fn routes() -> Router<ApiState> {
    Router::new().route("/practice/{user_id}/queue", post(compose_queue))
}

async fn compose_queue(
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
    ApiJson(payload): ApiJson<QueueRequest>,
) -> Result<Json<QueueResponse>, ApiError> {
    let language = parse_language(&payload.language)?;
    validate_level(&payload.level)?;
    let count = validate_queue_count(
        payload.count,
        state.default_queue_size,
        state.max_queue_size,
    )?;

    let scope = LearnerScope::new(user_id, language, payload.level);
    let mut rng = StdRng::from_entropy();

    let outcome = get_mixed_vocabulary(
        state.store.as_ref(),
        &scope,
        payload.pool,
        count,
        Utc::now(),
        &mut rng,
    )
    .await?;

    Ok(Json(QueueResponse {
        items: outcome.items,
        degraded: outcome.degraded,
    }))
}
