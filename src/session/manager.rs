use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::editor::{EditorFactory, EditorSettings, EditorSurface};
use crate::models::PresencePayload;
use crate::presence::PresenceOverlayRenderer;
use crate::services::MessageLog;
use crate::ws::{
    CollabError, CollabEvent, CollaborationFactory, EventDispatcher, EventKind, RemoteCursor, SessionEvent,
    SessionId,
};
use super::active_session::{Session, SessionState};

/// Message shown when a session fails and the editor keeps its last contents
pub const READ_ONLY_MESSAGE: &str = "Connection to document closed, document is now READ ONLY";

const SUBSCRIBED_EVENTS: [EventKind; 6] = [
    EventKind::Error,
    EventKind::Disconnect,
    EventKind::Connect,
    EventKind::Document,
    EventKind::Presence,
    EventKind::Cursor,
];

/// Owns the single current session slot.
///
/// Only this type writes the slot. Every event carries the id of the session that
/// produced it and is dropped unless that session is still current.
pub struct SessionLifecycleManager {
    endpoint: String,
    settings: EditorSettings,
    editors: Box<dyn EditorFactory>,
    clients: Box<dyn CollaborationFactory>,
    renderer: PresenceOverlayRenderer,
    events: UnboundedSender<SessionEvent>,
    current: Option<Session>,
    /// Editor left on screen after its session failed or disconnected
    mounted: Option<Box<dyn EditorSurface>>,
    state: SessionState,
    next_id: SessionId,
}

impl SessionLifecycleManager {
    pub fn new(
        endpoint: impl Into<String>,
        settings: EditorSettings,
        editors: Box<dyn EditorFactory>,
        clients: Box<dyn CollaborationFactory>,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let manager = Self {
            endpoint: endpoint.into(),
            settings,
            editors,
            clients,
            renderer: PresenceOverlayRenderer::default(),
            events,
            current: None,
            mounted: None,
            state: SessionState::Idle,
            next_id: 0,
        };
        (manager, rx)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Read-only view of the current session
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn current_id(&self) -> Option<SessionId> {
        self.current.as_ref().map(Session::id)
    }

    /// Tear down whatever is open and start a session for `document_id`.
    pub fn switch_to(&mut self, document_id: &str, log: &mut MessageLog) -> Result<SessionId, CollabError> {
        // The slot is emptied before anything new exists, so a late event from the
        // old client can never match the new session.
        if let Some(old) = self.current.take() {
            info!("Leaving document {} (session {})", old.document_id(), old.id());
            old.close().destroy();
        }
        if let Some(mut editor) = self.mounted.take() {
            editor.destroy();
        }

        let mut editor = self.editors.create();
        let mode = self.settings.apply(editor.as_mut(), document_id);

        self.next_id += 1;
        let id = self.next_id;
        let dispatcher = EventDispatcher::new(id, self.events.clone());
        let mut collab = self.clients.create(document_id, dispatcher);
        let subscriptions = SUBSCRIBED_EVENTS
            .iter()
            .map(|kind| collab.subscribe(*kind))
            .collect();

        let mut session = Session::new(id, document_id, mode, editor, collab, subscriptions);
        self.state = SessionState::Connecting;
        info!("Opening document {} in {} mode (session {})", document_id, mode, id);

        if let Err(e) = session.connect(&self.endpoint) {
            error!("Failed to connect session {}: {}", id, e);
            log.error(READ_ONLY_MESSAGE);
            self.mounted = Some(session.close());
            self.state = SessionState::Closed;
            return Err(e);
        }

        self.current = Some(session);
        Ok(id)
    }

    /// Close the current session on request.
    pub fn disconnect(&mut self, log: &mut MessageLog) {
        if let Some(session) = self.current.take() {
            log.info(format!("Closed document {}", session.document_id()));
            self.mounted = Some(session.close());
            self.state = SessionState::Closed;
        }
    }

    /// Apply one event from the event loop. Returns false for stale events.
    pub fn handle_event(&mut self, event: SessionEvent, log: &mut MessageLog) -> bool {
        if self.current_id() != Some(event.session) {
            debug!("Discarding {:?} from stale session {}", event.event.kind(), event.session);
            return false;
        }

        match event.event {
            CollabEvent::Connect => self.on_connect(log),
            CollabEvent::Document => self.on_document(log),
            CollabEvent::Presence(payload) => on_presence(payload, log),
            CollabEvent::Cursor(cursor) => self.on_cursor(cursor),
            CollabEvent::Error(err) => self.on_error(&err, log),
            CollabEvent::Disconnect(reason) => self.on_disconnect(reason, log),
        }
        true
    }

    fn on_connect(&mut self, log: &mut MessageLog) {
        let Some(session) = self.current.as_mut() else { return };
        match session.join() {
            Ok(()) => {
                debug!("Join requested for {}", session.document_id());
                session.set_state(SessionState::Active);
                self.state = SessionState::Active;
            }
            Err(e) => self.on_error(&e.to_string(), log),
        }
    }

    fn on_document(&mut self, log: &mut MessageLog) {
        let Some(session) = self.current.as_mut() else { return };
        log.info(format!("Opened document {}", session.document_id()));
        session.set_state(SessionState::Joined);
        self.state = SessionState::Joined;
    }

    fn on_cursor(&mut self, cursor: RemoteCursor) {
        let Some(session) = self.current.as_mut() else { return };
        let editor = session.editor_mut();
        let Some(position) = editor.cursor_coordinates(cursor.line, cursor.column) else {
            return;
        };
        let marker = self
            .renderer
            .render_in_viewport(&cursor.identity, editor.viewport(), position);
        editor.show_remote_cursor(&cursor.identity, marker);
    }

    fn on_error(&mut self, err: &str, log: &mut MessageLog) {
        let Some(session) = self.current.take() else { return };
        error!("Session {} for {} failed: {}", session.id(), session.document_id(), err);
        log.error(READ_ONLY_MESSAGE);
        self.mounted = Some(session.close());
        self.state = SessionState::Closed;
    }

    fn on_disconnect(&mut self, reason: Option<String>, log: &mut MessageLog) {
        let Some(session) = self.current.take() else { return };
        if let Some(reason) = reason.filter(|r| !r.is_empty()) {
            warn!("Session {} disconnected: {}", session.id(), reason);
        }
        log.info(format!("{} closed", session.document_id()));
        self.mounted = Some(session.close());
        self.state = SessionState::Closed;
    }
}

fn on_presence(payload: PresencePayload, log: &mut MessageLog) {
    match payload {
        PresencePayload::ChatMessage { identity, text } => log.chat(&identity, &text),
        PresencePayload::Heartbeat { .. } => {}
    }
}
