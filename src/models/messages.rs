use serde::{Deserialize, Serialize};

/// Frames sent to the collaboration server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SendMessage {
    #[serde(rename = "join")]
    Join { document_id: String },
    #[serde(rename = "presence")]
    Presence { message: String },
}

/// Frames received from the collaboration server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ReceivedMessage {
    #[serde(rename = "document")]
    Document {
        #[serde(default)]
        document_id: Option<String>,
    },
    #[serde(rename = "presence")]
    Presence {
        #[serde(default)]
        message: Option<String>,
    },
    #[serde(rename = "cursor")]
    Cursor {
        user_id: String,
        line: u32,
        #[serde(default)]
        column: u32,
    },
    #[serde(rename = "error")]
    Error { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_frame() {
        let frame = serde_json::to_string(&SendMessage::Join { document_id: "main.go".to_string() }).unwrap();
        assert_eq!(frame, r#"{"type":"join","document_id":"main.go"}"#);
    }

    #[test]
    fn test_received_frames() {
        let msg: ReceivedMessage = serde_json::from_str(r#"{"type":"document"}"#).unwrap();
        assert_eq!(msg, ReceivedMessage::Document { document_id: None });

        let msg: ReceivedMessage =
            serde_json::from_str(r#"{"type":"cursor","user_id":"alice","line":12}"#).unwrap();
        assert_eq!(msg, ReceivedMessage::Cursor { user_id: "alice".to_string(), line: 12, column: 0 });

        let msg: ReceivedMessage = serde_json::from_str(r#"{"type":"error","error":"gone"}"#).unwrap();
        assert_eq!(msg, ReceivedMessage::Error { error: "gone".to_string() });
    }

    #[test]
    fn test_unknown_frame_type_is_rejected() {
        assert!(serde_json::from_str::<ReceivedMessage>(r#"{"type":"transform"}"#).is_err());
    }
}
