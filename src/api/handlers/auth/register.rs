//! First-admin bootstrap.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use secrecy::SecretString;
use std::sync::Arc;

use crate::auth::AuthService;

use super::error::error_response;
use super::types::{AuthenticatedResponse, RegisterAdminRequest};

#[utoipa::path(
    post,
    path = "/v1/auth/register-admin",
    request_body = RegisterAdminRequest,
    responses(
        (status = 200, description = "First super admin created and signed in", body = AuthenticatedResponse),
        (status = 400, description = "Malformed request or a super admin already exists", body = String)
    ),
    tag = "auth"
)]
pub async fn register_admin(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<RegisterAdminRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let password = SecretString::from(request.password);
    match service
        .register_admin(
            &request.email,
            &password,
            &request.firstname,
            &request.lastname,
        )
        .await
    {
        Ok((token, user)) => {
            (StatusCode::OK, Json(AuthenticatedResponse { token, user })).into_response()
        }
        Err(err) => error_response(&err).into_response(),
    }
}
