use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, error, warn};

use crate::editor::{keymaps, themes, DEFAULT_BINDING, DEFAULT_THEME};

/// Client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Host (and optional port) of the share server
    #[serde(default = "default_server_host")]
    pub server_host: String,

    /// Use https/wss instead of http/ws
    #[serde(default)]
    pub secure: bool,

    /// Editor theme id
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Editor key binding id
    #[serde(default = "default_binding")]
    pub binding: String,

    /// Presence heartbeat period
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// File backing the durable identity store
    #[serde(default = "default_identity_store_path")]
    pub identity_store_path: String,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        match envy::prefixed("LEAPSHARE_").from_env::<Config>() {
            Ok(config) => {
                info!("Configuration loaded successfully");
                Ok(config.validated())
            }
            Err(e) => {
                error!("Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Replace theme and binding ids that are not in the static tables.
    pub fn validated(mut self) -> Self {
        if !themes().contains_key(self.theme.as_str()) {
            warn!("Unknown theme '{}', using '{}'", self.theme, DEFAULT_THEME);
            self.theme = DEFAULT_THEME.to_string();
        }
        if !keymaps().contains_key(self.binding.as_str()) {
            warn!("Unknown key binding '{}', using '{}'", self.binding, DEFAULT_BINDING);
            self.binding = DEFAULT_BINDING.to_string();
        }
        self
    }

    /// URL of the document listing endpoint
    pub fn files_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}/files", scheme, self.server_host)
    }

    /// URL of the collaboration socket
    pub fn socket_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{}://{}/socket", scheme, self.server_host)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: default_server_host(),
            secure: false,
            theme: default_theme(),
            binding: default_binding(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            identity_store_path: default_identity_store_path(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_server_host() -> String {
    "localhost:8001".to_string()
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

fn default_binding() -> String {
    DEFAULT_BINDING.to_string()
}

fn default_heartbeat_interval_ms() -> u64 {
    1000
}

fn default_identity_store_path() -> String {
    ".leapshare_identity".to_string()
}
