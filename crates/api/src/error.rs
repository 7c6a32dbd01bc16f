use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use copydesk_core::record::validate::KeyPathError;
use copydesk_core::store::StoreError;

/// API error type. Responses carry the flat `{"error": ...}` body the
/// admin editor already understands. Authentication (401) and
/// authorization (403) are distinct failures.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing, invalid or expired token.
    #[error("authentication required")]
    Unauthorized,

    /// Valid token, insufficient privilege.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The CI dispatch call failed; surfaced without retry.
    #[error("upstream dispatch failed: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<KeyPathError> for ApiError {
    fn from(err: KeyPathError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid authorization".to_string(),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::Upstream(msg) => {
                tracing::error!("Dispatch error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Rebuild dispatch failed".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Store(err) => {
                tracing::error!("Storage error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({ "error": message });

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn authentication_and_authorization_are_distinct() {
        assert_eq!(status_of(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(ApiError::Forbidden("admin access required".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn upstream_failures_surface_as_500() {
        assert_eq!(
            status_of(ApiError::Upstream("github said 422".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
