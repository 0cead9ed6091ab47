use std::fmt;

use crate::editor::EditorSurface;
use crate::models::PresencePayload;
use crate::ws::{CollabError, CollaborationClient, SessionId, SubscriptionHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been opened yet
    Idle,
    /// Handshake in flight
    Connecting,
    /// Connected, join request sent
    Active,
    /// Server confirmed the document is open
    Joined,
    /// Session discarded
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Connecting => write!(f, "connecting"),
            SessionState::Active => write!(f, "active"),
            SessionState::Joined => write!(f, "joined"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// One editor surface bound to one collaboration client.
///
/// Both handles are owned exclusively; [`Session::close`] consumes the session, so a
/// collaboration handle is closed exactly once.
pub struct Session {
    id: SessionId,
    document_id: String,
    mode: &'static str,
    editor: Box<dyn EditorSurface>,
    collab: Box<dyn CollaborationClient>,
    subscriptions: Vec<SubscriptionHandle>,
    state: SessionState,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        document_id: &str,
        mode: &'static str,
        editor: Box<dyn EditorSurface>,
        collab: Box<dyn CollaborationClient>,
        subscriptions: Vec<SubscriptionHandle>,
    ) -> Self {
        Self {
            id,
            document_id: document_id.to_string(),
            mode,
            editor,
            collab,
            subscriptions,
            state: SessionState::Connecting,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Syntax mode chosen for the document
    pub fn mode(&self) -> &'static str {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn editor_mut(&mut self) -> &mut dyn EditorSurface {
        self.editor.as_mut()
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub(crate) fn connect(&mut self, endpoint: &str) -> Result<(), CollabError> {
        self.collab.connect(endpoint)
    }

    pub(crate) fn join(&self) -> Result<(), CollabError> {
        self.collab.join_document(&self.document_id)
    }

    pub fn send_presence(&self, payload: &PresencePayload) -> Result<(), CollabError> {
        let message = payload
            .to_json()
            .map_err(|e| CollabError::Transport(e.to_string()))?;
        self.collab.send_message(&message)
    }

    /// Drop every subscription, close the collaboration handle and hand back the
    /// editor, which the caller either destroys or leaves mounted.
    pub(crate) fn close(mut self) -> Box<dyn EditorSurface> {
        for handle in self.subscriptions.drain(..) {
            self.collab.unsubscribe(handle);
        }
        self.collab.close();
        self.editor
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("document_id", &self.document_id)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .finish()
    }
}
