//! OTP step of the login flow.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::auth::AuthService;

use super::error::error_response;
use super::session::{clear_login_cookie, extract_session_id};
use super::types::{OtpRequest, TokenResponse};

#[utoipa::path(
    post,
    path = "/v1/auth/otp",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "Code accepted; signed token issued", body = TokenResponse),
        (status = 400, description = "Malformed request", body = String),
        (status = 401, description = "Code incorrect or expired", body = String)
    ),
    tag = "auth"
)]
pub async fn otp(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<OtpRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    // A missing or mangled cookie flows through as `None` and fails with the
    // same error as a wrong code; the client cannot probe session state.
    let session_id = extract_session_id(&headers);
    match service.verify_otp(session_id, &request.token).await {
        Ok(token) => {
            let mut response_headers = HeaderMap::new();
            if let Ok(cookie) = clear_login_cookie(service.config()) {
                response_headers.insert(SET_COOKIE, cookie);
            }
            (
                StatusCode::OK,
                response_headers,
                Json(TokenResponse { token }),
            )
                .into_response()
        }
        Err(err) => error_response(&err).into_response(),
    }
}
