//! Credential step of the login flow.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::error;

use crate::auth::AuthService;

use super::error::error_response;
use super::session::pending_session_cookie;
use super::types::{LoginRequest, LoginResponse};

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted; an OTP was issued. No token yet", body = LoginResponse),
        (status = 400, description = "Malformed request", body = String),
        (status = 401, description = "Invalid credentials", body = String),
        (status = 403, description = "Login not allowed by policy", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let password = SecretString::from(request.password);
    match service.login(&request.email, &password).await {
        Ok(started) => {
            let cookie = match pending_session_cookie(service.config(), started.session_id) {
                Ok(cookie) => cookie,
                Err(err) => {
                    error!("failed to build login cookie: {err}");
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal error".to_string(),
                    )
                        .into_response();
                }
            };
            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, cookie);
            (
                StatusCode::OK,
                headers,
                Json(LoginResponse { user: started.user }),
            )
                .into_response()
        }
        Err(err) => error_response(&err).into_response(),
    }
}
