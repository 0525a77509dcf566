//! Auth orchestrator: sequences verifier, OTP challenge, and token service.

use anyhow::Result;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::directory::UserDirectory;
use crate::email::{self, EmailMessage, EmailSender, FORGOT_PASSWORD_TEMPLATE, OTP_TEMPLATE};
use crate::events::{self, EventBus};

use super::challenge;
use super::error::AuthError;
use super::models::{NewUser, SanitizedUser, SUPER_ADMIN_ROLE};
use super::pending::PendingSessionStore;
use super::token::TokenService;
use super::verifier::{hash_password, normalize_email, valid_email, CredentialVerifier};

const DEFAULT_OTP_TTL_SECONDS: i64 = 10 * 60;
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;
const DEFAULT_RESET_TOKEN_TTL_SECONDS: i64 = 60 * 60;
const MIN_PASSWORD_CHARS: usize = 8;

/// Process-wide auth configuration. Immutable after startup.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    frontend_base_url: String,
    otp_ttl_seconds: i64,
    token_ttl_seconds: i64,
    reset_token_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString, frontend_base_url: String) -> Self {
        Self {
            jwt_secret,
            frontend_base_url,
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            reset_token_ttl_seconds: DEFAULT_RESET_TOKEN_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_reset_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.reset_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn otp_ttl_seconds(&self) -> i64 {
        self.otp_ttl_seconds
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }

    fn otp_ttl(&self) -> Duration {
        Duration::seconds(self.otp_ttl_seconds)
    }

    fn reset_token_ttl(&self) -> Duration {
        Duration::seconds(self.reset_token_ttl_seconds)
    }
}

/// Outcome of a successful credential submission. No usable token yet; the
/// session id only identifies the pending OTP step.
#[derive(Debug, Clone)]
pub struct LoginStarted {
    pub session_id: Uuid,
    pub user: SanitizedUser,
}

/// Sequences verifier → challenge → token service for one login attempt and
/// emits audit events along the way.
pub struct AuthService {
    config: AuthConfig,
    verifier: CredentialVerifier,
    pending: PendingSessionStore,
    tokens: TokenService,
    directory: Arc<dyn UserDirectory>,
    email: Arc<dyn EmailSender>,
    events: Arc<dyn EventBus>,
}

impl AuthService {
    /// # Errors
    ///
    /// Returns an error if the credential verifier cannot be constructed.
    pub fn new(
        config: AuthConfig,
        directory: Arc<dyn UserDirectory>,
        email: Arc<dyn EmailSender>,
        events: Arc<dyn EventBus>,
    ) -> Result<Self> {
        let verifier = CredentialVerifier::new(directory.clone())?;
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_seconds);
        Ok(Self {
            config,
            verifier,
            pending: PendingSessionStore::new(),
            tokens,
            directory,
            email,
            events,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Credential step. On success a pending session with a one-time code is
    /// opened and the code is emailed on a detached task; the returned
    /// response carries no token.
    ///
    /// # Errors
    ///
    /// See [`CredentialVerifier::verify`] for the failure taxonomy.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginStarted, AuthError> {
        let email = normalize_email(email);
        let user = match self.verifier.verify(&email, password).await {
            Ok(user) => user,
            Err(err) => {
                self.events.emit(
                    events::AUTH_ERROR,
                    json!({ "error": err.to_string(), "provider": "local" }),
                );
                return Err(err);
            }
        };

        let sanitized = user.sanitize();
        let pending = challenge::issue(sanitized.clone(), self.config.otp_ttl());

        // Fire-and-forget: the transition to the OTP step never waits on
        // delivery, and the caller sees the same response either way.
        email::dispatch_detached(
            self.email.clone(),
            EmailMessage {
                to: sanitized.email.clone(),
                template: OTP_TEMPLATE.to_string(),
                variables: json!({
                    "token": pending.otp_code,
                    "user": {
                        "email": sanitized.email,
                        "firstname": sanitized.firstname,
                        "lastname": sanitized.lastname,
                        "username": sanitized.username,
                    },
                }),
            },
        );

        let session_id = self.pending.insert(pending).await;

        self.events.emit(
            events::AUTH_SUCCESS,
            json!({ "user": sanitized, "provider": "local" }),
        );

        Ok(LoginStarted {
            session_id,
            user: sanitized,
        })
    }

    /// OTP step. Consumes the pending session whatever the outcome, so a
    /// failed attempt requires a fresh credential submission and a code can
    /// never be used twice.
    ///
    /// # Errors
    ///
    /// Returns `OtpInvalidOrExpired` for a missing session, a wrong code, or
    /// an expired code; the three are indistinguishable.
    pub async fn verify_otp(
        &self,
        session_id: Option<Uuid>,
        submitted: &str,
    ) -> Result<String, AuthError> {
        let Some(session_id) = session_id else {
            return Err(AuthError::OtpInvalidOrExpired);
        };
        let Some(pending) = self.pending.take(session_id).await else {
            return Err(AuthError::OtpInvalidOrExpired);
        };

        challenge::verify(&pending, submitted.trim())?;

        let token = self.tokens.issue(pending.user.id)?;

        self.events.emit(
            events::AUTH_SUCCESS,
            json!({ "user": pending.user, "provider": "local", "mfa": true }),
        );

        Ok(token)
    }

    /// Re-sign an existing valid token with only the subject claim.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` when verification fails; terminal, not retried.
    pub fn renew_token(&self, existing: &str) -> Result<String, AuthError> {
        self.tokens.renew(existing)
    }

    /// Start a password reset. Never reports whether the account exists;
    /// every internal failure is logged and swallowed.
    pub async fn forgot_password(&self, email: &str) {
        let email = normalize_email(email);
        if !valid_email(&email) {
            debug!("forgot-password for syntactically invalid email ignored");
            return;
        }

        let user = match self.directory.find_by_email(&email).await {
            Ok(Some(user)) if user.is_active && !user.blocked => user,
            Ok(_) => return,
            Err(err) => {
                error!("forgot-password lookup failed: {err}");
                return;
            }
        };

        let raw_token = match generate_reset_token() {
            Ok(token) => token,
            Err(err) => {
                error!("failed to generate reset token: {err}");
                return;
            }
        };
        let expiry = Utc::now() + self.config.reset_token_ttl();
        if let Err(err) = self
            .directory
            .set_reset_token(user.id, &hash_reset_token(&raw_token), expiry)
            .await
        {
            error!("failed to store reset token: {err}");
            return;
        }

        email::dispatch_detached(
            self.email.clone(),
            EmailMessage {
                to: user.email.clone(),
                template: FORGOT_PASSWORD_TEMPLATE.to_string(),
                variables: json!({
                    "token": raw_token,
                    "url": build_reset_url(self.config.frontend_base_url(), &raw_token),
                    "user": {
                        "email": user.email,
                        "firstname": user.firstname,
                        "lastname": user.lastname,
                    },
                }),
            },
        );
    }

    /// Consume a reset token, replace the password, and sign the user in.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an unknown/expired token or a too-short
    /// password, `Internal` for collaborator failures.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        password: &SecretString,
    ) -> Result<(String, SanitizedUser), AuthError> {
        let reset_token = reset_token.trim();
        if reset_token.is_empty() {
            return Err(AuthError::Validation("Missing reset token".to_string()));
        }
        validate_password(password)?;

        let user = self
            .directory
            .find_by_reset_token(&hash_reset_token(reset_token))
            .await
            .map_err(AuthError::Internal)?
            .ok_or_else(|| AuthError::Validation("Invalid reset token".to_string()))?;

        let password_hash = hash_password(password).map_err(AuthError::Internal)?;
        self.directory
            .update_password(user.id, &password_hash)
            .await
            .map_err(AuthError::Internal)?;

        let token = self.tokens.issue(user.id)?;
        Ok((token, user.sanitize()))
    }

    /// Bootstrap the first super admin. Rejected once one exists.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input or when a super admin is
    /// already registered, `Internal` for directory failures.
    pub async fn register_admin(
        &self,
        email: &str,
        password: &SecretString,
        firstname: &str,
        lastname: &str,
    ) -> Result<(String, SanitizedUser), AuthError> {
        let email = normalize_email(email);
        if !valid_email(&email) {
            return Err(AuthError::Validation("Invalid email".to_string()));
        }
        validate_password(password)?;
        if firstname.trim().is_empty() || lastname.trim().is_empty() {
            return Err(AuthError::Validation("Missing name".to_string()));
        }

        if self.directory.exists().await.map_err(AuthError::Internal)? {
            return Err(AuthError::Validation(
                "You cannot register a new super admin".to_string(),
            ));
        }

        let password_hash = hash_password(password).map_err(AuthError::Internal)?;
        let user = self
            .directory
            .create(NewUser {
                email,
                firstname: firstname.trim().to_string(),
                lastname: lastname.trim().to_string(),
                username: None,
                roles: vec![SUPER_ADMIN_ROLE.to_string()],
                is_active: true,
                password_hash,
            })
            .await
            .map_err(AuthError::Internal)?;

        let token = self.tokens.issue(user.id)?;
        Ok((token, user.sanitize()))
    }

    /// Emit the logout audit event for the bearer of a valid token. Tokens
    /// are stateless, so there is nothing to invalidate server side.
    pub async fn logout(&self, bearer_token: Option<&str>) {
        let Some(token) = bearer_token else { return };
        let Ok(claims) = self.tokens.verify(token) else {
            return;
        };
        let Ok(subject) = claims.sub.parse::<Uuid>() else {
            return;
        };

        let payload = match self.directory.find_by_id(subject).await {
            Ok(Some(user)) => json!({ "user": user.sanitize() }),
            Ok(None) => json!({ "user": { "id": subject } }),
            Err(err) => {
                error!("logout lookup failed: {err}");
                json!({ "user": { "id": subject } })
            }
        };
        self.events.emit(events::LOGOUT, payload);
    }
}

fn validate_password(password: &SecretString) -> Result<(), AuthError> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

/// Create a reset token for email links. Only the hash is stored.
fn generate_reset_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    rand::RngCore::try_fill_bytes(&mut rand::rngs::OsRng, &mut bytes)
        .map_err(|err| anyhow::anyhow!("failed to generate reset token: {err}"))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn hash_reset_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

fn build_reset_url(frontend_base_url: &str, token: &str) -> String {
    let base = frontend_base_url.trim_end_matches('/');
    format!("{base}/reset-password#token={token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_and_overrides() {
        let config = AuthConfig::new(
            SecretString::from("secret".to_string()),
            "https://admin.example.com".to_string(),
        );
        assert_eq!(config.otp_ttl_seconds(), DEFAULT_OTP_TTL_SECONDS);
        assert!(config.cookie_secure());

        let config = config
            .with_otp_ttl_seconds(30)
            .with_token_ttl_seconds(60)
            .with_reset_token_ttl_seconds(90);
        assert_eq!(config.otp_ttl_seconds(), 30);
        assert_eq!(config.token_ttl_seconds, 60);
        assert_eq!(config.reset_token_ttl_seconds, 90);
    }

    #[test]
    fn insecure_frontend_disables_secure_cookies() {
        let config = AuthConfig::new(
            SecretString::from("secret".to_string()),
            "http://localhost:3000".to_string(),
        );
        assert!(!config.cookie_secure());
    }

    #[test]
    fn reset_url_trims_trailing_slash() {
        let url = build_reset_url("https://admin.example.com/", "tok");
        assert_eq!(url, "https://admin.example.com/reset-password#token=tok");
    }

    #[test]
    fn reset_token_hash_is_stable_and_distinct() {
        let first = hash_reset_token("token");
        assert_eq!(first, hash_reset_token("token"));
        assert_ne!(first, hash_reset_token("other"));
    }

    #[test]
    fn reset_token_decodes_to_32_bytes() {
        let token = generate_reset_token().expect("token");
        let decoded = URL_SAFE_NO_PAD.decode(token.as_bytes()).expect("decode");
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn short_password_rejected() {
        let err = validate_password(&SecretString::from("short".to_string()))
            .expect_err("must fail");
        assert!(matches!(err, AuthError::Validation(_)));
    }
}
