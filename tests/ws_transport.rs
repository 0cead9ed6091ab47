use std::time::Duration;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::timeout;

use leapshare::editor::{EditorSettings, HeadlessEditorFactory};
use leapshare::models::PresencePayload;
use leapshare::services::{LogStyle, MessageLog};
use leapshare::session::{SessionLifecycleManager, SessionState};
use leapshare::ws::{
    CollabEvent, CollaborationClient, EventDispatcher, EventKind, RemoteCursor, SessionEvent, WsCollabClient,
    WsCollabFactory,
};

async fn socket_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(handle_socket)
}

/// Waits for a join, answers with the document, one chat line and a cursor, then hangs up.
async fn handle_socket(mut socket: WebSocket) {
    let Some(Ok(Message::Text(text))) = socket.recv().await else {
        return;
    };
    let frame: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(frame["type"], "join");
    let document_id = frame["document_id"].as_str().unwrap().to_string();

    let replies = [
        json!({ "type": "document", "document_id": document_id }),
        json!({
            "type": "presence",
            "message": json!({ "username": "srv", "text": "welcome" }).to_string(),
        }),
        json!({ "type": "cursor", "user_id": "srv", "line": 3, "column": 1 }),
    ];
    for reply in replies {
        socket.send(Message::Text(reply.to_string())).await.unwrap();
    }
    let _ = socket.send(Message::Close(None)).await;
}

async fn serve() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = Router::new().route("/socket", get(socket_handler));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("ws://{}/socket", addr)
}

async fn next_event(rx: &mut UnboundedReceiver<SessionEvent>) -> SessionEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

#[tokio::test]
async fn client_receives_server_frames() {
    let endpoint = serve().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = EventDispatcher::new(7, tx);
    let mut client = WsCollabClient::new("main.go", dispatcher);
    for kind in [
        EventKind::Connect,
        EventKind::Document,
        EventKind::Presence,
        EventKind::Cursor,
        EventKind::Error,
        EventKind::Disconnect,
    ] {
        client.subscribe(kind);
    }

    client.connect(&endpoint).unwrap();
    let event = next_event(&mut rx).await;
    assert_eq!(event.session, 7);
    assert_eq!(event.event, CollabEvent::Connect);

    client.join_document("main.go").unwrap();
    assert_eq!(next_event(&mut rx).await.event, CollabEvent::Document);
    assert_eq!(
        next_event(&mut rx).await.event,
        CollabEvent::Presence(PresencePayload::chat("srv", "welcome"))
    );
    assert_eq!(
        next_event(&mut rx).await.event,
        CollabEvent::Cursor(RemoteCursor {
            identity: "srv".to_string(),
            line: 3,
            column: 1,
        })
    );
    assert!(matches!(next_event(&mut rx).await.event, CollabEvent::Disconnect(_)));

    client.close();
    assert!(client.is_closed());
}

#[tokio::test]
async fn unsubscribed_kinds_are_not_forwarded() {
    let endpoint = serve().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut client = WsCollabClient::new("main.go", EventDispatcher::new(1, tx));
    client.subscribe(EventKind::Connect);
    client.subscribe(EventKind::Disconnect);

    client.connect(&endpoint).unwrap();
    assert_eq!(next_event(&mut rx).await.event, CollabEvent::Connect);
    client.join_document("main.go").unwrap();
    assert!(matches!(next_event(&mut rx).await.event, CollabEvent::Disconnect(_)));
}

#[tokio::test]
async fn unreachable_server_reports_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut client = WsCollabClient::new("a.txt", EventDispatcher::new(2, tx));
    client.subscribe(EventKind::Error);
    client.connect(&format!("ws://{}/socket", addr)).unwrap();
    assert!(matches!(next_event(&mut rx).await.event, CollabEvent::Error(_)));
}

#[tokio::test]
async fn manager_session_over_websocket() {
    let endpoint = serve().await;
    let (mut manager, mut events) = SessionLifecycleManager::new(
        endpoint,
        EditorSettings::default(),
        Box::new(HeadlessEditorFactory::default()),
        Box::new(WsCollabFactory),
    );
    let mut log = MessageLog::new();

    manager.switch_to("main.go", &mut log).unwrap();
    assert_eq!(manager.state(), SessionState::Connecting);

    while manager.state() != SessionState::Closed {
        let event = next_event(&mut events).await;
        manager.handle_event(event, &mut log);
    }

    let lines: Vec<(String, Option<LogStyle>)> =
        log.entries().map(|e| (e.text.clone(), e.style)).collect();
    assert!(lines.contains(&("Opened document main.go".to_string(), Some(LogStyle::Info))));
    assert!(lines.contains(&("srv: welcome".to_string(), Some(LogStyle::Chat))));
    assert!(manager.current().is_none());
}
