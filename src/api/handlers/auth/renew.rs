//! Signed-token renewal.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::auth::AuthService;

use super::error::error_response;
use super::types::{RenewTokenRequest, TokenResponse};

#[utoipa::path(
    post,
    path = "/v1/auth/renew-token",
    request_body = RenewTokenRequest,
    responses(
        (status = 200, description = "Fresh token carrying only the subject claim", body = TokenResponse),
        (status = 400, description = "Malformed request", body = String),
        (status = 401, description = "Invalid token", body = String)
    ),
    tag = "auth"
)]
pub async fn renew_token(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<RenewTokenRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    match service.renew_token(&request.token) {
        Ok(token) => (StatusCode::OK, Json(TokenResponse { token })).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}
