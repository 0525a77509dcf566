//! Signed session tokens: issuance, verification, and renewal.

use anyhow::Context;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::AuthError;

/// Claims carried by a signed session token.
///
/// Deliberately minimal: renewal re-issues from `sub` alone and never
/// refreshes profile data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 session tokens.
///
/// The signing secret is process-wide configuration, loaded once at startup
/// and never mutated; tokens are stateless and carry their own expiry.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Sign a token for the given subject.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if signing fails.
    pub fn issue(&self, subject: Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .context("failed to sign session token")
            .map_err(AuthError::Internal)
    }

    /// Decode and verify a token, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` for malformed payloads, bad signatures, or
    /// expired tokens. The caller cannot distinguish the cases.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode::<TokenClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Re-issue a token from a verified one, carrying only the subject.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` when the existing token fails verification.
    /// The failure is terminal; nothing is retried.
    pub fn renew(&self, existing: &str) -> Result<String, AuthError> {
        let claims = self.verify(existing)?;
        let subject = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthError::InvalidToken)?;
        self.issue(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(ttl_seconds: i64) -> TokenService {
        TokenService::new(
            &SecretString::from("test-secret-at-least-32-bytes-long".to_string()),
            ttl_seconds,
        )
    }

    #[test]
    fn issue_then_verify_round_trips_subject() {
        let tokens = service(3600);
        let subject = Uuid::new_v4();
        let token = tokens.issue(subject).expect("issue");
        let claims = tokens.verify(&token).expect("verify");
        assert_eq!(claims.sub, subject.to_string());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn renew_preserves_subject() {
        let tokens = service(3600);
        let subject = Uuid::new_v4();
        let original = tokens.issue(subject).expect("issue");
        let renewed = tokens.renew(&original).expect("renew");
        let claims = tokens.verify(&renewed).expect("verify renewed");
        assert_eq!(claims.sub, subject.to_string());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let tokens = service(3600);
        let token = tokens.issue(Uuid::new_v4()).expect("issue");
        // Flip a character in the signature segment.
        let mut tampered = token.clone();
        let last = tampered.pop().expect("non-empty");
        tampered.push(if last == 'a' { 'b' } else { 'a' });
        assert!(matches!(
            tokens.renew(&tampered),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Negative ttl puts exp beyond the default 60s validation leeway.
        let tokens = service(-120);
        let token = tokens.issue(Uuid::new_v4()).expect("issue");
        assert!(matches!(tokens.verify(&token), Err(AuthError::InvalidToken)));
        assert!(matches!(tokens.renew(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_input_is_rejected() {
        let tokens = service(3600);
        assert!(matches!(
            tokens.verify("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn verifier_with_other_secret_rejects() {
        let tokens = service(3600);
        let other = TokenService::new(
            &SecretString::from("another-secret-also-32-bytes-long!".to_string()),
            3600,
        );
        let token = tokens.issue(Uuid::new_v4()).expect("issue");
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }
}
