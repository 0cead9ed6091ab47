use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::models::{PresencePayload, ReceivedMessage, SendMessage};
use super::collab::{
    CollabError, CollabEvent, CollaborationClient, CollaborationFactory, EventDispatcher, EventKind,
    RemoteCursor, SubscriptionHandle,
};

/// Collaboration client speaking JSON text frames over a WebSocket.
pub struct WsCollabClient {
    document_id: String,
    dispatcher: EventDispatcher,
    outgoing: Option<mpsc::UnboundedSender<SendMessage>>,
    task: Option<JoinHandle<()>>,
    closed: bool,
}

impl WsCollabClient {
    pub fn new(document_id: &str, dispatcher: EventDispatcher) -> Self {
        Self {
            document_id: document_id.to_string(),
            dispatcher,
            outgoing: None,
            task: None,
            closed: false,
        }
    }

    fn queue(&self, msg: SendMessage) -> Result<(), CollabError> {
        if self.closed {
            return Err(CollabError::Closed);
        }
        match &self.outgoing {
            Some(tx) => tx.send(msg).map_err(|_| CollabError::Closed),
            None => Err(CollabError::NotConnected),
        }
    }
}

impl CollaborationClient for WsCollabClient {
    fn subscribe(&mut self, kind: EventKind) -> SubscriptionHandle {
        self.dispatcher.subscribe(kind)
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        self.dispatcher.unsubscribe(handle);
    }

    fn connect(&mut self, endpoint: &str) -> Result<(), CollabError> {
        if self.closed {
            return Err(CollabError::Closed);
        }
        if self.task.is_some() {
            return Ok(());
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.outgoing = Some(tx);
        info!("Connecting to {} for document {}", endpoint, self.document_id);
        self.task = Some(tokio::spawn(run_connection(
            endpoint.to_string(),
            rx,
            self.dispatcher.clone(),
        )));
        Ok(())
    }

    fn join_document(&self, document_id: &str) -> Result<(), CollabError> {
        self.queue(SendMessage::Join {
            document_id: document_id.to_string(),
        })
    }

    fn send_message(&self, payload: &str) -> Result<(), CollabError> {
        self.queue(SendMessage::Presence {
            message: payload.to_string(),
        })
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // The aborted task drops the socket, nothing is emitted after this point.
        self.outgoing = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        debug!("Closed collaboration client for {}", self.document_id);
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for WsCollabClient {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_connection(
    endpoint: String,
    mut outgoing: mpsc::UnboundedReceiver<SendMessage>,
    dispatcher: EventDispatcher,
) {
    let (socket, _response) = match connect_async(endpoint.as_str()).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Failed to connect to {}: {}", endpoint, e);
            dispatcher.emit(CollabEvent::Error(e.to_string()));
            return;
        }
    };
    dispatcher.emit(CollabEvent::Connect);

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            msg = outgoing.recv() => {
                let Some(msg) = msg else {
                    if let Err(e) = sink.close().await {
                        debug!("Closing socket to {} failed: {}", endpoint, e);
                    }
                    return;
                };
                let text = match serde_json::to_string(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to encode frame: {}", e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    dispatcher.emit(CollabEvent::Error(e.to_string()));
                    return;
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_frame(text.as_str(), &dispatcher),
                Some(Ok(Message::Close(frame))) => {
                    dispatcher.emit(CollabEvent::Disconnect(frame.map(|f| f.reason.to_string())));
                    return;
                }
                None => {
                    dispatcher.emit(CollabEvent::Disconnect(None));
                    return;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    dispatcher.emit(CollabEvent::Error(e.to_string()));
                    return;
                }
            }
        }
    }
}

/// Translate one server frame into an event.
pub(crate) fn handle_frame(text: &str, dispatcher: &EventDispatcher) {
    let msg: ReceivedMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Ignoring unrecognised frame: {}", e);
            return;
        }
    };

    match msg {
        ReceivedMessage::Document { .. } => {
            dispatcher.emit(CollabEvent::Document);
        }
        ReceivedMessage::Presence { message: Some(message) } => match PresencePayload::parse(&message) {
            Ok(payload) => {
                dispatcher.emit(CollabEvent::Presence(payload));
            }
            Err(e) => debug!("Ignoring malformed presence payload: {}", e),
        },
        ReceivedMessage::Presence { message: None } => {}
        ReceivedMessage::Cursor { user_id, line, column } => {
            dispatcher.emit(CollabEvent::Cursor(RemoteCursor {
                identity: user_id,
                line,
                column,
            }));
        }
        ReceivedMessage::Error { error } => {
            dispatcher.emit(CollabEvent::Error(error));
        }
    }
}

/// Builds [`WsCollabClient`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsCollabFactory;

impl CollaborationFactory for WsCollabFactory {
    fn create(&self, document_id: &str, dispatcher: EventDispatcher) -> Box<dyn CollaborationClient> {
        Box::new(WsCollabClient::new(document_id, dispatcher))
    }
}
