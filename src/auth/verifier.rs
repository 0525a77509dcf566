//! Primary credential verification against the user directory.

use anyhow::anyhow;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::error;

use crate::directory::UserDirectory;

use super::error::AuthError;
use super::models::User;

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Hash a password into an Argon2 PHC string for directory storage.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(password: &SecretString) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

fn verify_password(hash: &str, password: &SecretString) -> bool {
    PasswordHash::new(hash)
        .and_then(|parsed| {
            Argon2::default().verify_password(password.expose_secret().as_bytes(), &parsed)
        })
        .is_ok()
}

/// Checks email/password pairs and maps every outcome onto the closed error
/// taxonomy without leaking which field failed.
pub struct CredentialVerifier {
    directory: Arc<dyn UserDirectory>,
    dummy_hash: String,
}

impl CredentialVerifier {
    /// # Errors
    ///
    /// Returns an error if the throwaway hash cannot be computed.
    pub fn new(directory: Arc<dyn UserDirectory>) -> anyhow::Result<Self> {
        // Unknown accounts are verified against this hash so the missing-user
        // path costs the same as a real mismatch.
        let mut seed = [0u8; 32];
        rand::RngCore::try_fill_bytes(&mut rand::rngs::OsRng, &mut seed)
            .map_err(|err| anyhow!("failed to seed dummy credential: {err}"))?;
        let throwaway = SecretString::from(hex_string(&seed));
        let dummy_hash = hash_password(&throwaway)?;
        Ok(Self {
            directory,
            dummy_hash,
        })
    }

    /// Verify a credential pair, returning the directory user on success.
    ///
    /// # Errors
    ///
    /// - `Validation` for a malformed email or empty password.
    /// - `AuthenticationFailed` for unknown email, wrong password, or an
    ///   inactive account. The three cases are indistinguishable.
    /// - `LoginNotAllowed` for a policy-blocked account, only after the
    ///   password matched.
    /// - `Internal` when the directory lookup fails.
    pub async fn verify(&self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        if !valid_email(email) {
            return Err(AuthError::Validation("Invalid email".to_string()));
        }
        if password.expose_secret().is_empty() {
            return Err(AuthError::Validation("Missing password".to_string()));
        }

        let user = match self.directory.find_by_email(email).await {
            Ok(user) => user,
            Err(err) => {
                error!("User directory lookup failed: {err}");
                return Err(AuthError::Internal(err));
            }
        };

        let Some(user) = user else {
            let _ = verify_password(&self.dummy_hash, password);
            return Err(AuthError::AuthenticationFailed);
        };

        if !verify_password(&user.password_hash, password) {
            return Err(AuthError::AuthenticationFailed);
        }

        if !user.is_active {
            return Err(AuthError::AuthenticationFailed);
        }

        if user.blocked {
            return Err(AuthError::LoginNotAllowed(
                "Account is blocked".to_string(),
            ));
        }

        Ok(user)
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::NewUser;
    use crate::directory::memory::InMemoryUserDirectory;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    async fn directory_with_user(is_active: bool, blocked: bool) -> Arc<InMemoryUserDirectory> {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let hash = hash_password(&secret("correct horse")).expect("hash");
        directory
            .seed(NewUser {
                email: "alice@example.com".to_string(),
                firstname: "Alice".to_string(),
                lastname: "Doe".to_string(),
                username: None,
                roles: vec![],
                is_active,
                password_hash: hash,
            })
            .await
            .expect("seed");
        if blocked {
            directory.block("alice@example.com").await;
        }
        directory
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-domain@"));
    }

    #[tokio::test]
    async fn correct_credentials_return_user() {
        let directory = directory_with_user(true, false).await;
        let verifier = CredentialVerifier::new(directory).expect("verifier");
        let user = verifier
            .verify("alice@example.com", &secret("correct horse"))
            .await
            .expect("verify");
        assert_eq!(user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_identically() {
        let directory = directory_with_user(true, false).await;
        let verifier = CredentialVerifier::new(directory).expect("verifier");

        let wrong = verifier
            .verify("alice@example.com", &secret("wrong"))
            .await
            .expect_err("wrong password");
        let unknown = verifier
            .verify("nobody@example.com", &secret("wrong"))
            .await
            .expect_err("unknown email");

        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, AuthError::AuthenticationFailed));
        assert!(matches!(unknown, AuthError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn inactive_account_fails_generically() {
        let directory = directory_with_user(false, false).await;
        let verifier = CredentialVerifier::new(directory).expect("verifier");
        let err = verifier
            .verify("alice@example.com", &secret("correct horse"))
            .await
            .expect_err("inactive");
        assert!(matches!(err, AuthError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn blocked_account_surfaces_login_not_allowed() {
        let directory = directory_with_user(true, true).await;
        let verifier = CredentialVerifier::new(directory).expect("verifier");
        let err = verifier
            .verify("alice@example.com", &secret("correct horse"))
            .await
            .expect_err("blocked");
        assert!(matches!(err, AuthError::LoginNotAllowed(_)));
    }

    #[tokio::test]
    async fn malformed_email_is_a_validation_error() {
        let directory = directory_with_user(true, false).await;
        let verifier = CredentialVerifier::new(directory).expect("verifier");
        let err = verifier
            .verify("not-an-email", &secret("whatever"))
            .await
            .expect_err("validation");
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn empty_password_is_a_validation_error() {
        let directory = directory_with_user(true, false).await;
        let verifier = CredentialVerifier::new(directory).expect("verifier");
        let err = verifier
            .verify("alice@example.com", &secret(""))
            .await
            .expect_err("validation");
        assert!(matches!(err, AuthError::Validation(_)));
    }
}
