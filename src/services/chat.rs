use tracing::error;

use crate::models::PresencePayload;
use crate::session::SessionLifecycleManager;
use crate::ws::CollabError;
use super::identity::LocalIdentity;
use super::message_log::MessageLog;

pub const NO_SESSION_MESSAGE: &str = "You must open a document in order to send messages, \
they will be readable by other users editing that document";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Sent,
    /// No document is open; the input is kept
    NoSession,
    Failed(CollabError),
}

/// Chat input line.
#[derive(Debug, Clone, Default)]
pub struct ChatBar {
    value: String,
}

impl ChatBar {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Send the current input to everyone on the open document.
    pub fn submit(
        &mut self,
        sessions: &SessionLifecycleManager,
        identity: &LocalIdentity,
        log: &mut MessageLog,
    ) -> ChatOutcome {
        let Some(session) = sessions.current() else {
            log.error(NO_SESSION_MESSAGE);
            return ChatOutcome::NoSession;
        };

        let name = identity.display_name();
        match session.send_presence(&PresencePayload::chat(name, self.value.as_str())) {
            Ok(()) => {
                log.chat(name, &self.value);
                self.value.clear();
                ChatOutcome::Sent
            }
            Err(e) => {
                error!("Failed to send chat message: {}", e);
                log.error(format!("Message not sent: {}", e));
                ChatOutcome::Failed(e)
            }
        }
    }
}
