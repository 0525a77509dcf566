use crate::{api, auth::AuthConfig};
use anyhow::Result;
use secrecy::SecretString;
use tracing::debug;

pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub frontend_base_url: String,
    pub otp_ttl_seconds: i64,
    pub token_ttl_seconds: i64,
    pub reset_token_ttl_seconds: i64,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &self.dsn)
            .field("jwt_secret", &"***")
            .field("frontend_base_url", &self.frontend_base_url)
            .field("otp_ttl_seconds", &self.otp_ttl_seconds)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("reset_token_ttl_seconds", &self.reset_token_ttl_seconds)
            .finish()
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let auth_config = AuthConfig::new(args.jwt_secret, args.frontend_base_url)
        .with_otp_ttl_seconds(args.otp_ttl_seconds)
        .with_token_ttl_seconds(args.token_ttl_seconds)
        .with_reset_token_ttl_seconds(args.reset_token_ttl_seconds);

    api::new(args.port, args.dsn, auth_config).await
}
