use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ciyu_db::StoreError;
use ciyu_srs::SrsError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::metrics;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed input; always a caller bug, never coerced.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),
    #[error("Session {0} is not open")]
    SessionNotOpen(Uuid),
    #[error("Session {0} is already closed")]
    SessionAlreadyClosed(Uuid),
}

impl ApiError {
    /// Wrap a gateway failure, logging and counting it against `operation`.
    pub fn persistence(operation: &'static str, err: StoreError) -> Self {
        tracing::warn!(operation, error = %err, "Persistence gateway call failed");
        metrics::record_persistence_failure(operation);
        Self::PersistenceUnavailable(format!("{operation}: {err}"))
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::PersistenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::SessionNotOpen(_) | Self::SessionAlreadyClosed(_) => StatusCode::CONFLICT,
        }
    }

    /// Whether a quiz may carry on with local state after this error.
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidArgument(_))
    }
}

impl From<SrsError> for ApiError {
    fn from(err: SrsError) -> Self {
        match err {
            SrsError::InvalidArgument(msg) => Self::InvalidArgument(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::debug!("{self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let id = Uuid::nil();
        assert_eq!(
            ApiError::InvalidArgument("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PersistenceUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::SessionNotFound(id).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::SessionNotOpen(id).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::SessionAlreadyClosed(id).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_only_invalid_argument_is_fatal() {
        assert!(!ApiError::InvalidArgument("bad".into()).is_recoverable());
        assert!(ApiError::PersistenceUnavailable("down".into()).is_recoverable());
        assert!(ApiError::SessionNotOpen(Uuid::nil()).is_recoverable());
    }

    #[test]
    fn test_srs_error_maps_to_invalid_argument() {
        let err: ApiError = SrsError::InvalidArgument("negative".into()).into();
        assert!(matches!(err, ApiError::InvalidArgument(msg) if msg == "negative"));
    }
}
