use std::panic;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use leapshare::app::{App, UiCommand};
use leapshare::config::Config;
use leapshare::editor::HeadlessEditorFactory;
use leapshare::services::CookieFileStore;
use leapshare::ws::WsCollabFactory;

#[tokio::main(flavor = "current_thread")]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "leapshare=debug,info".into()
        }))
        .init();

    info!("Starting client...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    let store = CookieFileStore::new(&config.identity_store_path);
    let (app, events) = App::new(
        &config,
        Box::new(store),
        Box::new(HeadlessEditorFactory::default()),
        Box::new(WsCollabFactory),
    )
    .expect("Failed to build HTTP client");

    info!("Listing documents from {}", config.files_url());
    info!("Commands: /open <path>, /list, /refresh, /clear, /name <name>, /close, /quit; anything else is chat");

    // Forward stdin lines as UI commands
    let (commands_tx, commands) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match UiCommand::parse(&line) {
                Some(command) => {
                    if commands_tx.send(command).is_err() {
                        break;
                    }
                }
                None => warn!("Unrecognised command: {}", line),
            }
        }
    });

    app.run(events, commands).await;
}
