use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clients::{FetchError, FilesClient};
use crate::config::Config;
use crate::editor::{EditorFactory, EditorSettings};
use crate::presence::PresenceHeartbeat;
use crate::services::{Activation, ChatBar, DocumentList, IdentityStore, LocalIdentity, MessageLog};
use crate::session::SessionLifecycleManager;
use crate::ws::{CollaborationFactory, SessionEvent};

pub type ListingResult = Result<Vec<String>, FetchError>;

/// User actions coming from the surface around the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Refresh,
    ClearLog,
    List,
    Select(String),
    EditIdentity(String),
    Chat(String),
    Disconnect,
    Quit,
}

impl UiCommand {
    /// Parse one line typed into the terminal client.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(UiCommand::Chat(line.to_string()));
        };
        let (command, arg) = match rest.split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (rest, ""),
        };
        match command {
            "open" if !arg.is_empty() => Some(UiCommand::Select(arg.to_string())),
            "refresh" => Some(UiCommand::Refresh),
            "clear" => Some(UiCommand::ClearLog),
            "list" => Some(UiCommand::List),
            "name" => Some(UiCommand::EditIdentity(arg.to_string())),
            "close" => Some(UiCommand::Disconnect),
            "quit" => Some(UiCommand::Quit),
            _ => None,
        }
    }
}

/// Context object holding every piece of client state.
pub struct App {
    files: FilesClient,
    manager: SessionLifecycleManager,
    documents: DocumentList,
    identity: LocalIdentity,
    store: Box<dyn IdentityStore>,
    log: MessageLog,
    chat: ChatBar,
    heartbeat: PresenceHeartbeat,
}

impl App {
    pub fn new(
        config: &Config,
        store: Box<dyn IdentityStore>,
        editors: Box<dyn EditorFactory>,
        clients: Box<dyn CollaborationFactory>,
    ) -> Result<(Self, UnboundedReceiver<SessionEvent>), FetchError> {
        let files = FilesClient::new(config.files_url())?;
        let settings = EditorSettings::new(config.theme.as_str(), config.binding.as_str());
        let (manager, events) = SessionLifecycleManager::new(config.socket_url(), settings, editors, clients);
        let heartbeat = PresenceHeartbeat::new(config.heartbeat_interval());
        Ok((Self::from_parts(files, manager, store, heartbeat), events))
    }

    pub fn from_parts(
        files: FilesClient,
        manager: SessionLifecycleManager,
        store: Box<dyn IdentityStore>,
        heartbeat: PresenceHeartbeat,
    ) -> Self {
        let identity = LocalIdentity::load(store.as_ref());
        info!("Identity: {}", identity.display_name());
        Self {
            files,
            manager,
            documents: DocumentList::new(),
            identity,
            store,
            log: MessageLog::new(),
            chat: ChatBar::default(),
            heartbeat,
        }
    }

    pub fn documents(&self) -> &DocumentList {
        &self.documents
    }

    pub fn manager(&self) -> &SessionLifecycleManager {
        &self.manager
    }

    pub fn identity(&self) -> &LocalIdentity {
        &self.identity
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn chat(&self) -> &ChatBar {
        &self.chat
    }

    /// Merge a finished listing fetch; failures leave the list untouched.
    pub fn apply_listing(&mut self, result: ListingResult) {
        match result {
            Ok(paths) => {
                self.documents.reconcile(paths);
                self.print_documents();
            }
            Err(e) => error!("Failed to refresh document list: {}", e),
        }
    }

    pub fn select(&mut self, id: &str) {
        match self.documents.activate(id) {
            Activation::Switch(id) => {
                if let Err(e) = self.manager.switch_to(&id, &mut self.log) {
                    debug!("Switch to {} failed: {}", id, e);
                }
            }
            Activation::AlreadySelected => debug!("{} is already open", id),
            Activation::Unknown => {
                warn!("Selected unknown document {}", id);
                self.log.error(format!("{} is not in the document list", id));
            }
        }
    }

    pub fn handle_command(&mut self, command: UiCommand, listings: &UnboundedSender<ListingResult>) {
        match command {
            UiCommand::Refresh => self.request_listing(listings),
            UiCommand::ClearLog => self.log.clear(),
            UiCommand::List => self.print_documents(),
            UiCommand::Select(id) => self.select(&id),
            UiCommand::EditIdentity(value) => {
                if let Err(e) = self.identity.edit(value, self.store.as_mut()) {
                    error!("Failed to persist identity: {}", e);
                }
            }
            UiCommand::Chat(text) => {
                self.chat.set_value(text);
                self.chat.submit(&self.manager, &self.identity, &mut self.log);
            }
            UiCommand::Disconnect => self.manager.disconnect(&mut self.log),
            UiCommand::Quit => {}
        }
    }

    fn request_listing(&self, listings: &UnboundedSender<ListingResult>) {
        let files = self.files.clone();
        let tx = listings.clone();
        tokio::spawn(async move {
            let _ = tx.send(files.list_paths().await);
        });
    }

    fn print_documents(&self) {
        for entry in self.documents.entries() {
            let marker = if entry.selected { '*' } else { ' ' };
            info!(target: "leapshare::documents", "{} {}", marker, entry.id);
        }
    }

    /// Drive the client until `Quit` arrives or the command source closes.
    pub async fn run(
        mut self,
        mut events: UnboundedReceiver<SessionEvent>,
        mut commands: UnboundedReceiver<UiCommand>,
    ) {
        let (listing_tx, mut listings) = mpsc::unbounded_channel();
        self.request_listing(&listing_tx);

        let mut heartbeat = tokio::time::interval(self.heartbeat.period());
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(event) = events.recv() => {
                    self.manager.handle_event(event, &mut self.log);
                }
                Some(result) = listings.recv() => self.apply_listing(result),
                _ = heartbeat.tick() => {
                    self.heartbeat.tick(&self.manager, &self.identity);
                }
                command = commands.recv() => match command {
                    None | Some(UiCommand::Quit) => break,
                    Some(command) => self.handle_command(command, &listing_tx),
                },
            }
        }

        self.manager.disconnect(&mut self.log);
        info!("Client stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;
    use crate::session::testing::{Command, Harness, MockCollabFactory, MockEditorFactory};
    use crate::session::SessionState;
    use crate::ws::CollabEvent;

    struct Fixture {
        app: App,
        events: UnboundedReceiver<SessionEvent>,
        editors: MockEditorFactory,
        clients: MockCollabFactory,
    }

    impl Fixture {
        fn new() -> Self {
            let Harness { manager, events, editors, clients, .. } = Harness::new("ws://host/socket");
            let files = FilesClient::new("http://127.0.0.1:9/files").unwrap();
            let app = App::from_parts(files, manager, Box::new(MemoryStore::default()), PresenceHeartbeat::default());
            Self { app, events, editors, clients }
        }

        fn pump(&mut self) {
            while let Ok(event) = self.events.try_recv() {
                self.app.manager.handle_event(event, &mut self.app.log);
            }
        }

        fn editor_mode(&self, index: usize) -> Option<String> {
            self.editors.created.borrow()[index].borrow().mode.clone()
        }
    }

    fn paths(list: &[&str]) -> ListingResult {
        Ok(list.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(UiCommand::parse("/open main.go"), Some(UiCommand::Select("main.go".to_string())));
        assert_eq!(UiCommand::parse("/refresh"), Some(UiCommand::Refresh));
        assert_eq!(UiCommand::parse("/clear\n"), Some(UiCommand::ClearLog));
        assert_eq!(UiCommand::parse("/name"), Some(UiCommand::EditIdentity(String::new())));
        assert_eq!(UiCommand::parse("/name bob"), Some(UiCommand::EditIdentity("bob".to_string())));
        assert_eq!(UiCommand::parse("/close"), Some(UiCommand::Disconnect));
        assert_eq!(UiCommand::parse("/quit"), Some(UiCommand::Quit));
        assert_eq!(UiCommand::parse("hello all"), Some(UiCommand::Chat("hello all".to_string())));
        assert_eq!(UiCommand::parse("   "), None);
        assert_eq!(UiCommand::parse("/open"), None);
        assert_eq!(UiCommand::parse("/bogus"), None);
    }

    #[test]
    fn test_listing_select_and_refresh_scenario() {
        let mut f = Fixture::new();

        f.app.apply_listing(paths(&["readme.md", "main.go"]));
        assert_eq!(f.app.documents().entries().len(), 2);
        assert_eq!(f.app.documents().selected(), None);

        f.app.select("main.go");
        let session = f.app.manager().current().unwrap();
        assert_eq!(session.document_id(), "main.go");
        assert_eq!(session.mode(), "golang");
        assert_eq!(f.editor_mode(0).as_deref(), Some("golang"));

        f.app.apply_listing(paths(&["main.go", "readme.md"]));
        assert_eq!(f.app.documents().selected(), Some("main.go"));

        // reselecting the open document does not rebuild the session
        let id = f.app.manager().current_id();
        f.app.select("main.go");
        assert_eq!(f.app.manager().current_id(), id);
        assert_eq!(f.editors.created.borrow().len(), 1);
    }

    #[test]
    fn test_fetch_error_keeps_last_list() {
        let mut f = Fixture::new();
        f.app.apply_listing(paths(&["a.txt"]));
        f.app.apply_listing(Err(FetchError::Malformed(
            serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        )));
        assert_eq!(f.app.documents().entries().len(), 1);
        assert_eq!(f.app.documents().entries()[0].id, "a.txt");
    }

    #[test]
    fn test_identity_and_chat_commands() {
        let mut f = Fixture::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        f.app.handle_command(UiCommand::Chat("anyone?".to_string()), &tx);
        assert_eq!(f.app.chat().value(), "anyone?");

        f.app.handle_command(UiCommand::EditIdentity("carol".to_string()), &tx);
        assert_eq!(f.app.identity().display_name(), "carol");

        f.app.apply_listing(paths(&["a.txt"]));
        f.app.handle_command(UiCommand::Select("a.txt".to_string()), &tx);
        f.app.handle_command(UiCommand::Chat("hi".to_string()), &tx);
        assert_eq!(f.app.log().latest().unwrap().text, "carol: hi");
        assert!(f
            .clients
            .commands
            .borrow()
            .iter()
            .any(|(_, c)| *c == Command::Send(r#"{"username":"carol","text":"hi"}"#.to_string())));

        f.app.handle_command(UiCommand::ClearLog, &tx);
        assert!(f.app.log().is_empty());

        f.app.handle_command(UiCommand::Disconnect, &tx);
        assert_eq!(f.app.manager().state(), SessionState::Closed);
    }

    #[test]
    fn test_unknown_selection_is_reported() {
        let mut f = Fixture::new();
        f.app.select("nowhere.txt");
        assert!(f.app.manager().current().is_none());
        assert_eq!(f.app.log().latest().unwrap().text, "nowhere.txt is not in the document list");
    }

    #[test]
    fn test_switch_while_connecting_drops_old_events() {
        let mut f = Fixture::new();
        f.app.apply_listing(paths(&["a.txt", "b.py"]));
        f.app.select("a.txt");
        f.clients.dispatchers.borrow()[0].emit(CollabEvent::Connect);
        f.app.select("b.py");
        f.pump();

        assert_eq!(f.app.manager().state(), SessionState::Connecting);
        assert_eq!(f.app.manager().current().unwrap().document_id(), "b.py");
        assert!(!f
            .clients
            .commands
            .borrow()
            .iter()
            .any(|(_, c)| matches!(c, Command::Join(_))));

        f.clients.dispatchers.borrow()[1].emit(CollabEvent::Connect);
        f.clients.dispatchers.borrow()[1].emit(CollabEvent::Document);
        f.pump();
        assert_eq!(f.app.manager().state(), SessionState::Joined);
        assert_eq!(f.app.log().latest().unwrap().text, "Opened document b.py");
    }
}
