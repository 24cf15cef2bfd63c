use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Distinguishes user-authored messages from server-synthesized notices.
///
/// Only `User` messages are ever persisted; `System` messages (join/leave)
/// exist solely as broadcast events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    System,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::User => "user",
            MessageKind::System => "system",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "system" => MessageKind::System,
            _ => MessageKind::User,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub sender_name: String,
    pub body: Option<String>,
    /// Base64-encoded image payload, stored verbatim.
    pub image: Option<String>,
    /// Locale-formatted short time, computed server-side at receipt.
    pub display_time: String,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

/// Fields of a message as received from a client, before the store assigns
/// an id and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_name: String,
    pub body: Option<String>,
    pub image: Option<String>,
    pub display_time: String,
}

impl ChatMessage {
    /// A join/leave notice. Never persisted.
    pub fn system_notice(body: String, display_time: String) -> Self {
        Self {
            id: 0,
            sender_name: "System".into(),
            body: Some(body),
            image: None,
            display_time,
            kind: MessageKind::System,
            created_at: Utc::now(),
        }
    }
}
