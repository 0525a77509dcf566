//! Core multi-factor authentication flow.
//!
//! The flow is a small state machine per login attempt:
//! credentials are checked by the [`verifier`], a successful check opens a
//! pending session with a one-time code ([`challenge`] + [`pending`]), and a
//! valid code is exchanged for a signed token ([`token`]). The
//! [`service::AuthService`] sequences the steps and emits audit events.
//!
//! ## Enumeration resistance
//!
//! Credential and OTP failures collapse into generic errors: an unknown
//! email, a wrong password, an inactive account, a wrong code, and an
//! expired code are indistinguishable from the outside. The single detailed
//! credential failure is [`error::AuthError::LoginNotAllowed`], a deliberate
//! admin-facing policy signal.

pub mod challenge;
pub mod error;
pub mod models;
pub mod pending;
pub mod service;
pub mod token;
pub mod verifier;

pub use error::AuthError;
pub use models::{PendingSession, SanitizedUser, User};
pub use service::{AuthConfig, AuthService};
