//! Postgres-backed user directory.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::models::{NewUser, User, SUPER_ADMIN_ROLE};

use super::UserDirectory;

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            firstname: row.try_get("firstname")?,
            lastname: row.try_get("lastname")?,
            username: row.try_get("username")?,
            roles: row.try_get("roles")?,
            is_active: row.try_get("is_active")?,
            blocked: row.try_get("blocked")?,
            password_hash: row.try_get("password_hash")?,
        })
    }
}

const USER_COLUMNS: &str =
    "id, email, firstname, lastname, username, roles, is_active, blocked, password_hash";

/// Directory backed by the `admin_users` table (see `sql/schema.sql`).
#[derive(Clone, Debug)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM admin_users WHERE email = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up user by email")
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM admin_users WHERE id = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up user by id")
    }

    async fn exists(&self) -> Result<bool> {
        let query = "SELECT EXISTS (SELECT 1 FROM admin_users WHERE $1 = ANY(roles)) AS present";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(SUPER_ADMIN_ROLE)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to check for existing super admin")?;
        Ok(row.get("present"))
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let query = format!(
            r"
            INSERT INTO admin_users
                (email, firstname, lastname, username, roles, is_active, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = %query
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user.email)
            .bind(&user.firstname)
            .bind(&user.lastname)
            .bind(&user.username)
            .bind(&user.roles)
            .bind(user.is_active)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to create user")
    }

    async fn set_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &[u8],
        expiry: DateTime<Utc>,
    ) -> Result<()> {
        let query = r"
            UPDATE admin_users
            SET reset_token_hash = $2,
                reset_token_expiry = $3
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(user_id)
            .bind(token_hash)
            .bind(expiry)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to store reset token")?;
        Ok(())
    }

    async fn find_by_reset_token(&self, token_hash: &[u8]) -> Result<Option<User>> {
        let query = format!(
            r"
            SELECT {USER_COLUMNS}
            FROM admin_users
            WHERE reset_token_hash = $1
              AND reset_token_expiry > NOW()
            "
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        sqlx::query_as::<_, User>(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up user by reset token")
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        let query = r"
            UPDATE admin_users
            SET password_hash = $2,
                reset_token_hash = NULL,
                reset_token_expiry = NULL
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to update password")?;
        Ok(())
    }
}
