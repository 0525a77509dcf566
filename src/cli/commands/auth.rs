use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_OTP_TTL_SECONDS: &str = "otp-ttl-seconds";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_RESET_TOKEN_TTL_SECONDS: &str = "reset-token-ttl-seconds";

#[derive(Clone)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub frontend_base_url: String,
    pub otp_ttl_seconds: i64,
    pub token_ttl_seconds: i64,
    pub reset_token_ttl_seconds: i64,
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("jwt_secret", &"***")
            .field("frontend_base_url", &self.frontend_base_url)
            .field("otp_ttl_seconds", &self.otp_ttl_seconds)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("reset_token_ttl_seconds", &self.reset_token_ttl_seconds)
            .finish()
    }
}

impl Options {
    /// Parse auth arguments from matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing or empty.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let jwt_secret = matches.get_one::<String>(ARG_JWT_SECRET).cloned();
        let jwt_secret = match jwt_secret {
            Some(value) if !value.trim().is_empty() => SecretString::from(value),
            _ => anyhow::bail!("missing required argument: --{ARG_JWT_SECRET}"),
        };

        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:8000".to_string());

        let get_i64 = |id: &str, default: i64| {
            matches.get_one::<i64>(id).copied().unwrap_or(default)
        };

        Ok(Self {
            jwt_secret,
            frontend_base_url,
            otp_ttl_seconds: get_i64(ARG_OTP_TTL_SECONDS, 600),
            token_ttl_seconds: get_i64(ARG_TOKEN_TTL_SECONDS, 2_592_000),
            reset_token_ttl_seconds: get_i64(ARG_RESET_TOKEN_TTL_SECONDS, 3600),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret used to sign and verify admin tokens")
                .long_help(
                    "Secret used to sign and verify admin tokens (HMAC-SHA256). Rotating it invalidates every outstanding token.",
                )
                .env("GARDISTO_JWT_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Admin panel base URL used for reset links and CORS")
                .env("GARDISTO_FRONTEND_BASE_URL")
                .default_value("http://localhost:8000"),
        )
        .arg(
            Arg::new(ARG_OTP_TTL_SECONDS)
                .long(ARG_OTP_TTL_SECONDS)
                .help("Verification code TTL in seconds")
                .env("GARDISTO_OTP_TTL_SECONDS")
                .default_value("600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Signed admin token TTL in seconds")
                .env("GARDISTO_TOKEN_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_RESET_TOKEN_TTL_SECONDS)
                .long(ARG_RESET_TOKEN_TTL_SECONDS)
                .help("Password reset link TTL in seconds")
                .env("GARDISTO_RESET_TOKEN_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Command {
        with_args(Command::new("gardisto"))
    }

    #[test]
    fn parse_requires_jwt_secret() {
        temp_env::with_vars([("GARDISTO_JWT_SECRET", None::<&str>)], || {
            let matches = command().get_matches_from(vec!["gardisto"]);
            let result = Options::parse(&matches);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err
                    .to_string()
                    .contains("missing required argument: --jwt-secret"));
            }
        });
    }

    #[test]
    fn parse_applies_defaults() {
        temp_env::with_vars(
            [
                ("GARDISTO_JWT_SECRET", Some("s3cret")),
                ("GARDISTO_FRONTEND_BASE_URL", None),
                ("GARDISTO_OTP_TTL_SECONDS", None),
            ],
            || {
                let matches = command().get_matches_from(vec!["gardisto"]);
                let options = Options::parse(&matches).expect("options");
                assert_eq!(options.frontend_base_url, "http://localhost:8000");
                assert_eq!(options.otp_ttl_seconds, 600);
                assert_eq!(options.token_ttl_seconds, 2_592_000);
                assert_eq!(options.reset_token_ttl_seconds, 3600);
            },
        );
    }

    #[test]
    fn debug_redacts_secret() {
        temp_env::with_vars([("GARDISTO_JWT_SECRET", Some("s3cret"))], || {
            let matches = command().get_matches_from(vec!["gardisto"]);
            let options = Options::parse(&matches).expect("options");
            let debug = format!("{options:?}");
            assert!(!debug.contains("s3cret"));
            assert!(debug.contains("***"));
        });
    }
}
