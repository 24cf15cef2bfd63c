use serde::{Deserialize, Serialize};

use crate::models::message::ChatMessage;

/// Inbound WebSocket events from client to server.
///
/// Wire event names contain spaces (`"set nickname"`), hence the renames.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    #[serde(rename = "set nickname")]
    SetNickname { nickname: String },

    #[serde(rename = "chat message")]
    ChatMessage {
        sender_name: String,
        #[serde(default)]
        body: Option<String>,
        #[serde(default)]
        image: Option<String>,
    },

    #[serde(rename = "typing")]
    Typing,

    #[serde(rename = "stop typing")]
    StopTyping,
}

/// Outbound WebSocket events from server to client.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsOutboundEvent {
    /// Sent once per connection, on connect.
    #[serde(rename = "chat history")]
    ChatHistory { messages: Vec<ChatMessage> },

    /// Broadcast to all on join/leave.
    #[serde(rename = "update user list")]
    UpdateUserList { users: Vec<String> },

    /// Broadcast to all; `user` kind on send, `system` kind on join/leave.
    #[serde(rename = "chat message")]
    ChatMessage {
        #[serde(flatten)]
        message: ChatMessage,
    },

    /// To others only.
    #[serde(rename = "typing")]
    Typing { sender_name: String },

    /// To others only.
    #[serde(rename = "stop typing")]
    StopTyping,
}

impl WsOutboundEvent {
    pub fn to_json(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::error!(error=%e, "failed to serialize outbound event");
                None
            }
        }
    }
}
