//! Mapping of domain errors onto HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use calsync_domain::CalSyncError;

/// Error returned by every handler; the body is the serialized
/// [`CalSyncError`] (`{"type": ..., "message": ...}`).
#[derive(Debug)]
pub struct ApiError(pub CalSyncError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CalSyncError::UnauthorizedAccount(_) => StatusCode::NOT_FOUND,
            CalSyncError::Auth(_) => StatusCode::UNAUTHORIZED,
            CalSyncError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CalSyncError::RemoteFetch(_) | CalSyncError::SyncCursorInvalidated(_) => {
                StatusCode::BAD_GATEWAY
            }
            CalSyncError::Store(_) | CalSyncError::Config(_) | CalSyncError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<CalSyncError> for ApiError {
    fn from(err: CalSyncError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.0)).into_response()
    }
}

/// Timed-out sync passes answer 504 rather than going through the domain
/// error mapping.
pub(crate) fn timeout_response(seconds: u64) -> Response {
    let body = CalSyncError::RemoteFetch(format!("synchronization timed out after {seconds}s"));
    (StatusCode::GATEWAY_TIMEOUT, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_status_codes() {
        let cases = [
            (CalSyncError::UnauthorizedAccount("a".into()), StatusCode::NOT_FOUND),
            (CalSyncError::Auth("a".into()), StatusCode::UNAUTHORIZED),
            (CalSyncError::InvalidInput("a".into()), StatusCode::BAD_REQUEST),
            (CalSyncError::RemoteFetch("a".into()), StatusCode::BAD_GATEWAY),
            (CalSyncError::SyncCursorInvalidated("a".into()), StatusCode::BAD_GATEWAY),
            (CalSyncError::Store("a".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn timeout_answers_gateway_timeout() {
        assert_eq!(timeout_response(5).status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
