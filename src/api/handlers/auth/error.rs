//! Mapping from the auth error taxonomy to HTTP responses.

use axum::http::StatusCode;
use tracing::error;

use crate::auth::AuthError;

/// Produce the response for a failed auth operation.
///
/// Every generic variant maps to a fixed body, so two failures with
/// different internal causes are byte-identical on the wire. `Internal`
/// detail is logged here and never surfaced.
pub(super) fn error_response(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::AuthenticationFailed
        | AuthError::OtpInvalidOrExpired
        | AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, err.to_string()),
        AuthError::LoginNotAllowed(_) => (StatusCode::FORBIDDEN, err.to_string()),
        AuthError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        AuthError::Internal(inner) => {
            error!("internal auth failure: {inner:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn generic_failures_map_to_unauthorized() {
        for err in [
            AuthError::AuthenticationFailed,
            AuthError::OtpInvalidOrExpired,
            AuthError::InvalidToken,
        ] {
            let (status, _) = error_response(&err);
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn login_not_allowed_maps_to_forbidden_with_detail() {
        let (status, body) =
            error_response(&AuthError::LoginNotAllowed("Account is blocked".to_string()));
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("Account is blocked"));
    }

    #[test]
    fn internal_detail_never_reaches_the_body() {
        let (status, body) = error_response(&AuthError::Internal(anyhow!("pool exhausted")));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal error");
    }
}
