//! Service error types with HTTP status code mapping.
//!
//! [`CoordinatorError`] is the central error type. Handlers convert it
//! into the function contract's JSON error envelope `{"error": message}`.
//!
//! Stale-state conditions (duplicate replies, already-claimed shifts)
//! are deliberately *not* errors: the inbound channel is fire-and-forget
//! text messaging with no acknowledgment path, so those paths resolve to
//! a logged no-op instead (see `service::TransitionOutcome`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{ClaimId, RequestId};

/// JSON error envelope returned by every endpoint.
///
/// ```json
/// { "error": "coverage request not found: 4f1c..." }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Server-side error enum with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// Coverage request with the given ID was not found.
    #[error("coverage request not found: {0}")]
    RequestNotFound(RequestId),

    /// Coverage claim with the given ID was not found.
    #[error("coverage claim not found: {0}")]
    ClaimNotFound(ClaimId),

    /// Shift with the given ID was not found in the directory.
    #[error("shift not found: {0}")]
    ShiftNotFound(Uuid),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The operation conflicts with existing workflow state (e.g. the
    /// shift already has an open coverage request).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence layer failure.
    #[error("store error: {0}")]
    Store(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoordinatorError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::RequestNotFound(_) | Self::ClaimNotFound(_) | Self::ShiftNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CoordinatorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_by_category() {
        assert_eq!(
            CoordinatorError::RequestNotFound(RequestId::new()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CoordinatorError::InvalidRequest("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CoordinatorError::Conflict("open request exists".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CoordinatorError::Store("db down".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
