//! Audit event bus collaborator.
//!
//! Payloads always carry sanitized user projections; raw credentials and
//! OTP codes never reach the bus.

use serde_json::Value;
use tracing::info;

/// Emitted when a credential check or OTP exchange succeeds.
pub const AUTH_SUCCESS: &str = "admin.auth.success";
/// Emitted when a credential check fails.
pub const AUTH_ERROR: &str = "admin.auth.error";
/// Emitted on explicit logout.
pub const LOGOUT: &str = "admin.logout";

/// Collaborator interface for audit notifications.
pub trait EventBus: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
}

/// Default bus that writes audit events to the structured log.
#[derive(Clone, Debug)]
pub struct LogEventBus;

impl EventBus for LogEventBus {
    fn emit(&self, event: &str, payload: Value) {
        info!(target: "audit", event, payload = %payload, "audit event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn log_bus_accepts_events() {
        LogEventBus.emit(AUTH_SUCCESS, json!({ "provider": "local" }));
        LogEventBus.emit(LOGOUT, json!({}));
    }
}
