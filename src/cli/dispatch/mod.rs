//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        jwt_secret: auth_opts.jwt_secret,
        frontend_base_url: auth_opts.frontend_base_url,
        otp_ttl_seconds: auth_opts.otp_ttl_seconds,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        reset_token_ttl_seconds: auth_opts.reset_token_ttl_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::actions::Action;

    #[test]
    fn jwt_secret_required() {
        temp_env::with_vars(
            [
                ("GARDISTO_JWT_SECRET", None::<&str>),
                (
                    "GARDISTO_DSN",
                    Some("postgres://user@localhost:5432/gardisto"),
                ),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["gardisto"]);
                let result = handler(&matches);
                assert!(result.is_err());
                if let Err(err) = result {
                    assert!(err
                        .to_string()
                        .contains("missing required argument: --jwt-secret"));
                }
            },
        );
    }

    #[test]
    fn builds_server_action() {
        temp_env::with_vars(
            [
                ("GARDISTO_JWT_SECRET", Some("s3cret")),
                (
                    "GARDISTO_DSN",
                    Some("postgres://user@localhost:5432/gardisto"),
                ),
                ("GARDISTO_PORT", Some("9000")),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["gardisto"]);
                let action = handler(&matches).expect("action");
                let Action::Server(args) = action;
                assert_eq!(args.port, 9000);
                assert_eq!(args.dsn, "postgres://user@localhost:5432/gardisto");
                assert_eq!(args.otp_ttl_seconds, 600);
            },
        );
    }
}
