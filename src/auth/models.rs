use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Role granted to the first registered administrator.
pub const SUPER_ADMIN_ROLE: &str = "super-admin";

/// Administrator account as held by the user directory.
///
/// Owned by the directory; the auth core treats it as read-mostly and never
/// persists it. `password_hash` is an Argon2 PHC string and must not leave
/// this struct unsanitized.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub username: Option<String>,
    pub roles: Vec<String>,
    pub is_active: bool,
    /// Disabled by policy. Distinct from `is_active`: a blocked account
    /// yields a detailed `LoginNotAllowed`, an inactive one a generic
    /// failure.
    pub blocked: bool,
    pub password_hash: String,
}

/// Fields required to create a directory account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub username: Option<String>,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub password_hash: String,
}

/// Projection of a user that is safe to return to clients, log, or put on
/// the event bus. Carries no secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SanitizedUser {
    pub id: Uuid,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub roles: Vec<String>,
    pub is_active: bool,
}

impl User {
    /// Strip secret material for anything that leaves the auth core.
    #[must_use]
    pub fn sanitize(&self) -> SanitizedUser {
        SanitizedUser {
            id: self.id,
            email: self.email.clone(),
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
            username: self.username.clone(),
            roles: self.roles.clone(),
            is_active: self.is_active,
        }
    }
}

/// Server-held state bridging the credential step and the OTP step of one
/// login attempt.
///
/// Invariant: a session never holds a code without its expiry; both are set
/// together at issue time.
#[derive(Debug, Clone)]
pub struct PendingSession {
    pub user: SanitizedUser,
    pub otp_code: String,
    pub otp_expiry: DateTime<Utc>,
}
