//! Recording doubles for the editor and collaboration contracts.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::editor::{EditorFactory, EditorSettings, EditorSurface, ScreenPosition, ViewportMetrics};
use crate::presence::CursorMarker;
use crate::services::MessageLog;
use crate::ws::{
    CollabError, CollabEvent, CollaborationClient, CollaborationFactory, EventDispatcher, EventKind, SessionEvent,
    SessionId, SubscriptionHandle,
};
use super::SessionLifecycleManager;

#[derive(Debug, Clone, Default)]
pub(crate) struct EditorRecord {
    pub theme: Option<String>,
    pub keyboard: Option<String>,
    pub mode: Option<String>,
    pub overlays: Vec<(String, CursorMarker)>,
    pub destroyed: bool,
}

struct MockEditor {
    record: Rc<RefCell<EditorRecord>>,
}

impl EditorSurface for MockEditor {
    fn set_theme(&mut self, theme: &str) {
        self.record.borrow_mut().theme = Some(theme.to_string());
    }

    fn set_keyboard_handler(&mut self, binding: Option<&str>) {
        self.record.borrow_mut().keyboard = binding.map(str::to_string);
    }

    fn set_mode(&mut self, mode: &str) {
        self.record.borrow_mut().mode = Some(mode.to_string());
    }

    fn viewport(&self) -> ViewportMetrics {
        ViewportMetrics {
            line_height: 20,
            first_visible_row: 0,
            last_visible_row: 20,
        }
    }

    fn cursor_coordinates(&self, line: u32, column: u32) -> Option<ScreenPosition> {
        Some(ScreenPosition {
            top: line as i32 * 20,
            left: column as i32 * 10,
        })
    }

    fn show_remote_cursor(&mut self, identity: &str, marker: CursorMarker) {
        self.record.borrow_mut().overlays.push((identity.to_string(), marker));
    }

    fn destroy(&mut self) {
        self.record.borrow_mut().destroyed = true;
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockEditorFactory {
    pub created: Rc<RefCell<Vec<Rc<RefCell<EditorRecord>>>>>,
}

impl EditorFactory for MockEditorFactory {
    fn create(&self) -> Box<dyn EditorSurface> {
        let record = Rc::new(RefCell::new(EditorRecord::default()));
        self.created.borrow_mut().push(record.clone());
        Box::new(MockEditor { record })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Subscribe(EventKind),
    Unsubscribe,
    Connect(String),
    Join(String),
    Send(String),
    Close,
}

type CommandLog = Rc<RefCell<Vec<(SessionId, Command)>>>;

struct MockCollab {
    dispatcher: EventDispatcher,
    commands: CommandLog,
    fail_connect: bool,
    closed: bool,
}

impl MockCollab {
    fn record(&self, command: Command) {
        self.commands.borrow_mut().push((self.dispatcher.session(), command));
    }
}

impl CollaborationClient for MockCollab {
    fn subscribe(&mut self, kind: EventKind) -> SubscriptionHandle {
        self.record(Command::Subscribe(kind));
        self.dispatcher.subscribe(kind)
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        self.record(Command::Unsubscribe);
        self.dispatcher.unsubscribe(handle);
    }

    fn connect(&mut self, endpoint: &str) -> Result<(), CollabError> {
        if self.fail_connect {
            return Err(CollabError::Transport("connection refused".to_string()));
        }
        self.record(Command::Connect(endpoint.to_string()));
        Ok(())
    }

    fn join_document(&self, document_id: &str) -> Result<(), CollabError> {
        if self.closed {
            return Err(CollabError::Closed);
        }
        self.record(Command::Join(document_id.to_string()));
        Ok(())
    }

    fn send_message(&self, payload: &str) -> Result<(), CollabError> {
        if self.closed {
            return Err(CollabError::Closed);
        }
        self.record(Command::Send(payload.to_string()));
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.record(Command::Close);
            self.closed = true;
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockCollabFactory {
    pub commands: CommandLog,
    pub dispatchers: Rc<RefCell<Vec<EventDispatcher>>>,
    pub fail_connect: Rc<Cell<bool>>,
}

impl CollaborationFactory for MockCollabFactory {
    fn create(&self, _document_id: &str, dispatcher: EventDispatcher) -> Box<dyn CollaborationClient> {
        self.dispatchers.borrow_mut().push(dispatcher.clone());
        Box::new(MockCollab {
            dispatcher,
            commands: self.commands.clone(),
            fail_connect: self.fail_connect.get(),
            closed: false,
        })
    }
}

/// A manager wired to recording doubles plus the loop-side receiver and log.
pub(crate) struct Harness {
    pub manager: SessionLifecycleManager,
    pub events: UnboundedReceiver<SessionEvent>,
    pub log: MessageLog,
    pub editors: MockEditorFactory,
    pub clients: MockCollabFactory,
}

impl Harness {
    pub fn new(endpoint: &str) -> Self {
        Self::with_settings(endpoint, EditorSettings::default())
    }

    pub fn with_settings(endpoint: &str, settings: EditorSettings) -> Self {
        let editors = MockEditorFactory::default();
        let clients = MockCollabFactory::default();
        let (manager, events) = SessionLifecycleManager::new(
            endpoint,
            settings,
            Box::new(editors.clone()),
            Box::new(clients.clone()),
        );
        Self {
            manager,
            events,
            log: MessageLog::new(),
            editors,
            clients,
        }
    }

    /// Snapshot of the n-th editor created
    pub fn editor(&self, index: usize) -> EditorRecord {
        self.editors.created.borrow()[index].borrow().clone()
    }

    pub fn commands_for(&self, session: SessionId) -> Vec<Command> {
        self.clients
            .commands
            .borrow()
            .iter()
            .filter(|(id, _)| *id == session)
            .map(|(_, command)| command.clone())
            .collect()
    }

    /// Emit through the n-th client's dispatcher, as its transport would.
    pub fn emit(&self, client: usize, event: CollabEvent) -> bool {
        self.clients.dispatchers.borrow()[client].emit(event)
    }

    /// Deliver everything queued so far, like the event loop does.
    pub fn pump(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.manager.handle_event(event, &mut self.log);
        }
    }
}
