//! Templated-email collaborator.
//!
//! Delivery is fire-and-forget: the request path spawns a detached task and
//! never awaits the result, so callers cannot observe delivery status or
//! timing. Failures are logged server side only.

use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Template rendered when a login reaches the OTP step.
pub const OTP_TEMPLATE: &str = "admin-otp";
/// Template rendered for the password-reset link.
pub const FORGOT_PASSWORD_TEMPLATE: &str = "admin-forgot-password";

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to: String,
    pub template: String,
    pub variables: Value,
}

/// Collaborator interface for outbound templated email.
///
/// `send` runs on a detached task; implementations must be cheap to call and
/// tolerate failure.
pub trait EmailSender: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the message cannot be handed to the transport.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Default sender that writes outbound mail to the structured log.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to = %message.to,
            template = %message.template,
            "email send stub"
        );
        Ok(())
    }
}

/// Deliver a message on a detached task.
///
/// The caller's response shape and latency are identical whether delivery
/// succeeds or fails, which keeps address validity unobservable.
pub fn dispatch_detached(sender: Arc<dyn EmailSender>, message: EmailMessage) {
    tokio::spawn(async move {
        if let Err(err) = sender.send(&message) {
            error!(
                template = %message.template,
                "email dispatch failed: {err}"
            );
        }
    });
}
