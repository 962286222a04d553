use axum::Router;

use crate::{queue, review, session, state::ApiState};

/// V1 API routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .merge(queue::routes())
        .merge(review::routes())
        .merge(session::routes())
}
