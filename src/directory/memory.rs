//! In-memory directory for tests and database-less local runs.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::auth::models::{NewUser, User, SUPER_ADMIN_ROLE};

use super::UserDirectory;

#[derive(Debug, Clone)]
struct ResetToken {
    user_id: Uuid,
    expiry: DateTime<Utc>,
}

/// Directory backed by process memory. Writes are serialized by an
/// `RwLock`; nothing is awaited while it is held.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, User>>,
    reset_tokens: RwLock<HashMap<Vec<u8>, ResetToken>>,
}

impl InMemoryUserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account directly, bypassing the bootstrap guard.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` mirrors the trait's contract.
    pub async fn seed(&self, user: NewUser) -> Result<User> {
        self.create(user).await
    }

    /// Mark an account as policy-blocked.
    pub async fn block(&self, email: &str) {
        let mut users = self.users.write().expect("users lock");
        for user in users.values_mut() {
            if user.email == email {
                user.blocked = true;
            }
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().expect("users lock");
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().expect("users lock");
        Ok(users.get(&user_id).cloned())
    }

    async fn exists(&self) -> Result<bool> {
        let users = self.users.read().expect("users lock");
        Ok(users
            .values()
            .any(|user| user.roles.iter().any(|role| role == SUPER_ADMIN_ROLE)))
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            firstname: user.firstname,
            lastname: user.lastname,
            username: user.username,
            roles: user.roles,
            is_active: user.is_active,
            blocked: false,
            password_hash: user.password_hash,
        };
        let mut users = self.users.write().expect("users lock");
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &[u8],
        expiry: DateTime<Utc>,
    ) -> Result<()> {
        let mut tokens = self.reset_tokens.write().expect("tokens lock");
        // One live token per account.
        tokens.retain(|_, token| token.user_id != user_id);
        tokens.insert(token_hash.to_vec(), ResetToken { user_id, expiry });
        Ok(())
    }

    async fn find_by_reset_token(&self, token_hash: &[u8]) -> Result<Option<User>> {
        let user_id = {
            let tokens = self.reset_tokens.read().expect("tokens lock");
            match tokens.get(token_hash) {
                Some(token) if token.expiry > Utc::now() => Some(token.user_id),
                _ => None,
            }
        };
        match user_id {
            Some(user_id) => self.find_by_id(user_id).await,
            None => Ok(None),
        }
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        {
            let mut users = self.users.write().expect("users lock");
            if let Some(user) = users.get_mut(&user_id) {
                user.password_hash = password_hash.to_string();
            }
        }
        let mut tokens = self.reset_tokens.write().expect("tokens lock");
        tokens.retain(|_, token| token.user_id != user_id);
        Ok(())
    }
}
