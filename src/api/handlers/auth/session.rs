//! Pending-session cookie plumbing and logout.
//!
//! The two-step login is bridged by an opaque session id carried in an
//! `HttpOnly` cookie; the client never sees the code or expiry held server
//! side.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{AuthConfig, AuthService};

const LOGIN_COOKIE_NAME: &str = "gardisto_login";

/// Build the cookie binding the client to its pending OTP step.
pub(super) fn pending_session_cookie(
    config: &AuthConfig,
    session_id: Uuid,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.otp_ttl_seconds();
    let mut cookie = format!(
        "{LOGIN_COOKIE_NAME}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn clear_login_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{LOGIN_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Extract the pending session id from the login cookie, if any.
pub(super) fn extract_session_id(headers: &HeaderMap) -> Option<Uuid> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == LOGIN_COOKIE_NAME {
            return val.parse::<Uuid>().ok();
        }
    }
    None
}

pub(super) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Logged out; tokens are stateless, the client discards its copy")
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    service: Extension<Arc<AuthService>>,
) -> impl IntoResponse {
    let bearer = extract_bearer_token(&headers);
    service.logout(bearer.as_deref()).await;

    // Clear any leftover pending-session cookie as well.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_login_cookie(service.config()) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config(frontend: &str) -> AuthConfig {
        AuthConfig::new(SecretString::from("secret".to_string()), frontend.to_string())
    }

    #[test]
    fn cookie_carries_session_id_and_ttl() {
        let config = config("https://admin.example.com").with_otp_ttl_seconds(600);
        let session_id = Uuid::new_v4();
        let cookie = pending_session_cookie(&config, session_id).expect("cookie");
        let value = cookie.to_str().expect("ascii");
        assert!(value.contains(&session_id.to_string()));
        assert!(value.contains("Max-Age=600"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
    }

    #[test]
    fn insecure_frontend_omits_secure_attribute() {
        let config = config("http://localhost:3000");
        let cookie = pending_session_cookie(&config, Uuid::new_v4()).expect("cookie");
        assert!(!cookie.to_str().expect("ascii").contains("Secure"));
    }

    #[test]
    fn extract_session_id_finds_login_cookie() {
        let session_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("other=1; {LOGIN_COOKIE_NAME}={session_id}"))
                .expect("header"),
        );
        assert_eq!(extract_session_id(&headers), Some(session_id));
    }

    #[test]
    fn extract_session_id_ignores_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("gardisto_login=not-a-uuid"),
        );
        assert_eq!(extract_session_id(&headers), None);
        assert_eq!(extract_session_id(&HeaderMap::new()), None);
    }

    #[test]
    fn extract_bearer_token_strips_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def".to_string()));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
