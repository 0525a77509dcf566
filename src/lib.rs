//! # Gardisto (Administrator Authentication Service)
//!
//! `gardisto` authenticates administrators for a management panel using a
//! two-step login: password verification followed by a one-time code sent by
//! email. Successful verification yields a signed bearer token that clients
//! renew to stay signed in.
//!
//! ## Login flow
//!
//! 1. `POST /v1/auth/login` checks the credentials and, when they are valid,
//!    emails a 6-digit code and sets a short-lived login cookie. No token is
//!    issued at this step.
//! 2. `POST /v1/auth/otp` consumes the pending login session and exchanges a
//!    correct, unexpired code for a signed token.
//!
//! ## Enumeration resistance
//!
//! Failed logins return the same status and body whether the account does not
//! exist, the password is wrong, or the account is deactivated. The only
//! detailed failure is a blocked account, which is reported after the password
//! has been verified.
//!
//! ## Password reset
//!
//! `POST /v1/auth/forgot-password` always answers `204`; when the account
//! exists a single-use reset link is emailed. The raw reset token is never
//! stored, only its digest.

pub mod api;
pub mod auth;
pub mod cli;
pub mod directory;
pub mod email;
pub mod events;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
