use serde::{Deserialize, Serialize};

/// Name used for participants that never set one
pub const ANONYMOUS: &str = "anon";

/// Metadata a participant broadcasts to everyone editing the same document.
///
/// A payload carrying a string `text` is a chat line; everything else is a
/// heartbeat that only keeps the participant's name alive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPresence")]
pub enum PresencePayload {
    Heartbeat { identity: String },
    ChatMessage { identity: String, text: String },
}

#[derive(Deserialize)]
struct RawPresence {
    #[serde(default)]
    username: Option<serde_json::Value>,
    #[serde(default)]
    text: Option<serde_json::Value>,
}

impl From<RawPresence> for PresencePayload {
    fn from(raw: RawPresence) -> Self {
        let identity = match raw.username {
            Some(serde_json::Value::String(name)) if !name.is_empty() => name,
            _ => ANONYMOUS.to_string(),
        };
        match raw.text {
            Some(serde_json::Value::String(text)) => PresencePayload::ChatMessage { identity, text },
            _ => PresencePayload::Heartbeat { identity },
        }
    }
}

#[derive(Serialize)]
struct WirePresence<'a> {
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

impl PresencePayload {
    pub fn heartbeat(identity: impl Into<String>) -> Self {
        PresencePayload::Heartbeat { identity: identity.into() }
    }

    pub fn chat(identity: impl Into<String>, text: impl Into<String>) -> Self {
        PresencePayload::ChatMessage {
            identity: identity.into(),
            text: text.into(),
        }
    }

    /// Decode the JSON string a participant sent.
    pub fn parse(message: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(message)
    }

    /// Encode as the JSON string sent through the collaboration client.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let wire = match self {
            PresencePayload::Heartbeat { identity } => WirePresence { username: identity, text: None },
            PresencePayload::ChatMessage { identity, text } => WirePresence {
                username: identity,
                text: Some(text),
            },
        };
        serde_json::to_string(&wire)
    }

    pub fn identity(&self) -> &str {
        match self {
            PresencePayload::Heartbeat { identity } | PresencePayload::ChatMessage { identity, .. } => identity,
        }
    }
}
