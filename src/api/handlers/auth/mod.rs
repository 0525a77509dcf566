//! Auth endpoints.
//!
//! Handlers are thin adapters over [`crate::auth::AuthService`]: they parse
//! the request, thread the pending-session cookie through the two-step
//! login, and map the closed error taxonomy onto HTTP responses.
//!
//! ## Response discipline
//!
//! Generic failures must stay byte-identical regardless of cause. Handlers
//! therefore never branch on why a credential or OTP check failed; the
//! mapping in [`error`] is the single place where status codes and bodies
//! are produced.

mod error;
pub(crate) mod login;
pub(crate) mod otp;
pub(crate) mod password;
pub(crate) mod register;
pub(crate) mod renew;
pub(crate) mod session;
pub(crate) mod types;
