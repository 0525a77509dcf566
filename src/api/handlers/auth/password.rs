//! Password-reset endpoints.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use secrecy::SecretString;
use std::sync::Arc;

use crate::auth::AuthService;

use super::error::error_response;
use super::types::{AuthenticatedResponse, ForgotPasswordRequest, ResetPasswordRequest};

#[utoipa::path(
    post,
    path = "/v1/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 204, description = "Always, whether or not the account exists"),
        (status = 400, description = "Malformed request", body = String)
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    // 204 regardless of outcome; anything else would leak which addresses
    // have accounts.
    service.forgot_password(&request.email).await;
    StatusCode::NO_CONTENT.into_response()
}

#[utoipa::path(
    post,
    path = "/v1/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced; caller signed in", body = AuthenticatedResponse),
        (status = 400, description = "Invalid/expired reset token or weak password", body = String)
    ),
    tag = "auth"
)]
pub async fn reset_password(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let password = SecretString::from(request.password);
    match service
        .reset_password(&request.reset_token, &password)
        .await
    {
        Ok((token, user)) => {
            (StatusCode::OK, Json(AuthenticatedResponse { token, user })).into_response()
        }
        Err(err) => error_response(&err).into_response(),
    }
}
