//! HTTP surface for the domain error taxonomy
//!
//! Every backend failure is surfaced as an HTTP status with a
//! human-readable body; nothing is swallowed.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use larkwire_domain::LarkwireError;
use tracing::warn;

/// Wrapper turning [`LarkwireError`] into an HTTP response
#[derive(Debug)]
pub struct ApiError(pub LarkwireError);

impl From<LarkwireError> for ApiError {
    fn from(err: LarkwireError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status carried by this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LarkwireError::MissingParameter(_)
            | LarkwireError::UnknownOrExpiredState
            | LarkwireError::TokenExchangeFailed(_)
            | LarkwireError::IdentityFetchFailed(_) => StatusCode::BAD_REQUEST,
            LarkwireError::Unauthorized | LarkwireError::InvalidToken => StatusCode::UNAUTHORIZED,
            LarkwireError::UpstreamUnavailable(_) | LarkwireError::Network(_) => {
                StatusCode::BAD_GATEWAY
            }
            LarkwireError::UpstreamStatus { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            LarkwireError::Config(_) | LarkwireError::Storage(_) | LarkwireError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(%status, error = %self.0, "request failed");
        (status, self.0.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the error-to-status mapping.
    use super::*;

    /// Validates the taxonomy-to-status mapping required by the HTTP surface.
    #[test]
    fn test_status_mapping() {
        let cases = [
            (LarkwireError::MissingParameter("code".into()), StatusCode::BAD_REQUEST),
            (LarkwireError::UnknownOrExpiredState, StatusCode::BAD_REQUEST),
            (LarkwireError::TokenExchangeFailed("denied".into()), StatusCode::BAD_REQUEST),
            (LarkwireError::IdentityFetchFailed("nope".into()), StatusCode::BAD_REQUEST),
            (LarkwireError::Unauthorized, StatusCode::UNAUTHORIZED),
            (LarkwireError::InvalidToken, StatusCode::UNAUTHORIZED),
            (LarkwireError::UpstreamUnavailable("down".into()), StatusCode::BAD_GATEWAY),
            (LarkwireError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    /// Validates that mirrored upstream statuses pass through.
    #[test]
    fn test_upstream_status_mirrored() {
        let err = ApiError(LarkwireError::UpstreamStatus { status: 429, body: "slow down".into() });
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
