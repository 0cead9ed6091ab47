use std::time::Duration;
use tracing::trace;

use crate::models::PresencePayload;
use crate::services::LocalIdentity;
use crate::session::{SessionLifecycleManager, SessionState};

/// Periodically re-announces the local identity so peers keep showing it.
#[derive(Debug, Clone, Copy)]
pub struct PresenceHeartbeat {
    period: Duration,
}

impl PresenceHeartbeat {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Send one heartbeat if a session is connected. Returns whether one was sent.
    ///
    /// A missing or closed handle is a normal condition and is skipped silently.
    pub fn tick(&self, sessions: &SessionLifecycleManager, identity: &LocalIdentity) -> bool {
        let Some(session) = sessions.current() else {
            return false;
        };
        if !matches!(session.state(), SessionState::Active | SessionState::Joined) {
            return false;
        }
        let sent = session
            .send_presence(&PresencePayload::heartbeat(identity.display_name()))
            .is_ok();
        if sent {
            trace!("Heartbeat sent for session {}", session.id());
        }
        sent
    }
}

impl Default for PresenceHeartbeat {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
