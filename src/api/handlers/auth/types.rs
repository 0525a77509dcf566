//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::auth::SanitizedUser;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Credential success: user projection only, no usable token yet.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub user: SanitizedUser,
}

/// The OTP exchange reuses the original field name `token` for the 6-digit
/// code.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OtpRequest {
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RenewTokenRequest {
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub reset_token: String,
    pub password: String,
}

impl fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("reset_token", &"***")
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize)]
pub struct RegisterAdminRequest {
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
}

impl fmt::Debug for RegisterAdminRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterAdminRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .finish()
    }
}

/// Returned by reset-password and register-admin: the caller is signed in.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthenticatedResponse {
    pub token: String,
    pub user: SanitizedUser,
}
