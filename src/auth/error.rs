//! Closed error taxonomy for the authentication flow.

use thiserror::Error;

/// Failure outcomes surfaced by the auth core.
///
/// The generic variants intentionally carry no cause-level detail;
/// `LoginNotAllowed` is the one credential failure allowed to propagate
/// verbatim.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Any credential mismatch: unknown email, wrong password, or an
    /// inactive account.
    #[error("Invalid credentials")]
    AuthenticationFailed,

    /// Account blocked by policy. Surfaced with detail on purpose.
    #[error("Login not allowed: {0}")]
    LoginNotAllowed(String),

    /// Wrong code, expired code, or no pending session at all.
    #[error("Verification code is incorrect or expired")]
    OtpInvalidOrExpired,

    /// Malformed or unverifiable signed token.
    #[error("Invalid token")]
    InvalidToken,

    /// Malformed request shape. Field-level detail is safe to expose.
    #[error("{0}")]
    Validation(String),

    /// Collaborator failure. Logged at the boundary, never detailed to the
    /// client.
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::AuthError;
    use anyhow::anyhow;

    #[test]
    fn generic_variants_carry_no_detail() {
        assert_eq!(AuthError::AuthenticationFailed.to_string(), "Invalid credentials");
        assert_eq!(
            AuthError::OtpInvalidOrExpired.to_string(),
            "Verification code is incorrect or expired"
        );
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid token");
    }

    #[test]
    fn login_not_allowed_keeps_reason() {
        let err = AuthError::LoginNotAllowed("Account is blocked".to_string());
        assert_eq!(err.to_string(), "Login not allowed: Account is blocked");
    }

    #[test]
    fn internal_hides_source_message() {
        let err = AuthError::Internal(anyhow!("database unreachable"));
        assert_eq!(err.to_string(), "Internal error");
    }
}
