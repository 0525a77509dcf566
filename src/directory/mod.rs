//! User-directory collaborator.
//!
//! The directory owns administrator accounts; the auth core only reads them
//! (plus the reset-token fields it maintains). The Postgres implementation
//! backs production; the in-memory one backs tests and local runs without a
//! database.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::models::{NewUser, User};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryUserDirectory;
pub use postgres::PgUserDirectory;

/// Collaborator interface to the administrator directory.
///
/// Implementations serialize their own writes; the auth core holds no lock
/// across calls.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    /// Whether any super-admin account exists.
    async fn exists(&self) -> Result<bool>;

    async fn create(&self, user: NewUser) -> Result<User>;

    /// Attach a password-reset token hash with its absolute expiry.
    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &[u8],
        expiry: DateTime<Utc>,
    ) -> Result<()>;

    /// Look up the account holding an unexpired reset-token hash.
    async fn find_by_reset_token(&self, token_hash: &[u8]) -> Result<Option<User>>;

    /// Replace the password hash and clear any pending reset token.
    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<()>;
}
