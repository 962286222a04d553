use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::{error::ApiError, state::ApiState, v1};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .nest("/v1", v1::routes())
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Ready once the persistence gateway answers
async fn ready(State(state): State<ApiState>) -> Result<StatusCode, ApiError> {
    state
        .store
        .ping()
        .await
        .map_err(|e| ApiError::persistence("ping", e))?;
    Ok(StatusCode::OK)
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
