//! In-process store for per-login pending sessions.

use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::models::PendingSession;

/// Holds the state between the credential step and the OTP step.
///
/// Entries are single use: `take` removes the entry while holding the lock,
/// so a code can never be verified twice even under concurrent submissions.
/// Stale entries from abandoned attempts are purged on insert; no cleanup
/// task is required.
#[derive(Debug, Default)]
pub struct PendingSessionStore {
    sessions: Mutex<HashMap<Uuid, PendingSession>>,
}

impl PendingSessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh pending session and return its opaque id.
    ///
    /// A second login by the same user simply creates a new entry; the old
    /// one ages out with its expiry.
    pub async fn insert(&self, pending: PendingSession) -> Uuid {
        let session_id = Uuid::new_v4();
        let mut sessions = self.sessions.lock().await;
        let now = Utc::now();
        sessions.retain(|_, entry| entry.otp_expiry > now);
        sessions.insert(session_id, pending);
        session_id
    }

    /// Remove and return the pending session, if present.
    ///
    /// Expired entries are still returned; the challenge check reports them
    /// with the same error as a wrong code, so handing them out leaks
    /// nothing.
    pub async fn take(&self, session_id: Uuid) -> Option<PendingSession> {
        self.sessions.lock().await.remove(&session_id)
    }
}
