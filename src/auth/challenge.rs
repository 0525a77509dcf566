//! One-time-password challenge: code generation and verification.

use chrono::{Duration, Utc};
use rand::{rngs::OsRng, Rng};

use super::error::AuthError;
use super::models::{PendingSession, SanitizedUser};

/// Inclusive range of valid codes. Six digits, no leading zeros.
pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;

/// Draw a code from the OS CSPRNG. A guessable code here is a direct
/// account-takeover risk, so `OsRng` is not negotiable.
#[must_use]
pub fn generate_code() -> String {
    OsRng.gen_range(OTP_MIN..=OTP_MAX).to_string()
}

/// Bind a fresh code and its absolute expiry into a pending session.
#[must_use]
pub fn issue(user: SanitizedUser, ttl: Duration) -> PendingSession {
    PendingSession {
        user,
        otp_code: generate_code(),
        otp_expiry: Utc::now() + ttl,
    }
}

/// Check a submitted code against the pending session.
///
/// Wrong code and expired code collapse into the same error so callers
/// cannot tell them apart. Expiry uses the wall clock, matching the stored
/// `otp_expiry`.
///
/// # Errors
///
/// Returns `OtpInvalidOrExpired` on mismatch or past-expiry submission.
pub fn verify(pending: &PendingSession, submitted: &str) -> Result<(), AuthError> {
    if pending.otp_code != submitted || Utc::now() > pending.otp_expiry {
        return Err(AuthError::OtpInvalidOrExpired);
    }
    Ok(())
}
