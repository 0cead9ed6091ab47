use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::models::PresencePayload;

/// Identifies one session; never reused within a process.
pub type SessionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connect,
    Document,
    Presence,
    Cursor,
    Error,
    Disconnect,
}

/// Caret position of a remote participant, in document coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCursor {
    pub identity: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollabEvent {
    Connect,
    Document,
    Presence(PresencePayload),
    Cursor(RemoteCursor),
    Error(String),
    Disconnect(Option<String>),
}

impl CollabEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CollabEvent::Connect => EventKind::Connect,
            CollabEvent::Document => EventKind::Document,
            CollabEvent::Presence(_) => EventKind::Presence,
            CollabEvent::Cursor(_) => EventKind::Cursor,
            CollabEvent::Error(_) => EventKind::Error,
            CollabEvent::Disconnect(_) => EventKind::Disconnect,
        }
    }
}

/// An event tagged with the session whose client produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: CollabEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

#[derive(Debug, Default)]
struct Subscriptions {
    next: u64,
    active: HashMap<SubscriptionHandle, EventKind>,
}

/// Forwards a client's events to the event loop, but only for kinds that still
/// have a live subscription.
///
/// Clones share the subscription table, so a transport task holding a clone stops
/// delivering as soon as the owning session unsubscribes.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    session: SessionId,
    tx: UnboundedSender<SessionEvent>,
    subscriptions: Arc<Mutex<Subscriptions>>,
}

impl EventDispatcher {
    pub fn new(session: SessionId, tx: UnboundedSender<SessionEvent>) -> Self {
        Self {
            session,
            tx,
            subscriptions: Arc::new(Mutex::new(Subscriptions::default())),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn subscribe(&self, kind: EventKind) -> SubscriptionHandle {
        let mut subs = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
        subs.next += 1;
        let handle = SubscriptionHandle(subs.next);
        subs.active.insert(handle, kind);
        handle
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut subs = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
        subs.active.remove(&handle).is_some()
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        let subs = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
        subs.active.values().any(|k| *k == kind)
    }

    /// Returns whether the event was handed to the event loop.
    pub fn emit(&self, event: CollabEvent) -> bool {
        if !self.is_subscribed(event.kind()) {
            debug!("Dropping {:?} event for session {}: no subscription", event.kind(), self.session);
            return false;
        }
        self.tx
            .send(SessionEvent {
                session: self.session,
                event,
            })
            .is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollabError {
    /// `connect` has not been called yet
    NotConnected,
    /// The handle was closed
    Closed,
    Transport(String),
}

impl fmt::Display for CollabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollabError::NotConnected => write!(f, "collaboration client is not connected"),
            CollabError::Closed => write!(f, "collaboration client is closed"),
            CollabError::Transport(e) => write!(f, "collaboration transport error: {}", e),
        }
    }
}

impl std::error::Error for CollabError {}

/// The external collaboration client, as driven by a session.
///
/// Text synchronisation happens inside the implementation; a session only connects,
/// joins a document, sends presence metadata and reacts to events.
pub trait CollaborationClient {
    fn subscribe(&mut self, kind: EventKind) -> SubscriptionHandle;
    fn unsubscribe(&mut self, handle: SubscriptionHandle);
    fn connect(&mut self, endpoint: &str) -> Result<(), CollabError>;
    fn join_document(&self, document_id: &str) -> Result<(), CollabError>;
    fn send_message(&self, payload: &str) -> Result<(), CollabError>;
    fn close(&mut self);
    fn is_closed(&self) -> bool;
}

pub trait CollaborationFactory {
    /// Build a client that reports through `dispatcher` for the given document.
    fn create(&self, document_id: &str, dispatcher: EventDispatcher) -> Box<dyn CollaborationClient>;
}
