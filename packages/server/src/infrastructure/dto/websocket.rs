//! Hub protocol message DTOs.
//!
//! Decoding goes through these types; encoding builds JSON directly in
//! [`codec`](crate::infrastructure::codec).

use serde::Deserialize;
use serde_json::Value;

/// Client -> server: invoke a hub method.
pub const SEND_MESSAGE: &str = "SendMessage";
pub const JOIN_ROOM: &str = "JoinRoom";
pub const LEAVE_ROOM: &str = "LeaveRoom";
pub const SEND_MESSAGE_TO_ROOM: &str = "SendMessageToRoom";

/// Server -> client targets.
pub const RECEIVE_MESSAGE: &str = "ReceiveMessage";
pub const RECEIVE_SYSTEM_NOTIFICATION: &str = "ReceiveSystemNotification";

/// Value of the `type` field of a hub message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Invocation,
    StreamItem,
    Completion,
    StreamInvocation,
    CancelInvocation,
    Ping,
    Close,
}

impl MessageKind {
    pub fn code(self) -> u64 {
        match self {
            Self::Invocation => 1,
            Self::StreamItem => 2,
            Self::Completion => 3,
            Self::StreamInvocation => 4,
            Self::CancelInvocation => 5,
            Self::Ping => 6,
            Self::Close => 7,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Invocation),
            2 => Some(Self::StreamItem),
            3 => Some(Self::Completion),
            4 => Some(Self::StreamInvocation),
            5 => Some(Self::CancelInvocation),
            6 => Some(Self::Ping),
            7 => Some(Self::Close),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Invocation => "invocation",
            Self::StreamItem => "stream item",
            Self::Completion => "completion",
            Self::StreamInvocation => "stream invocation",
            Self::CancelInvocation => "cancel invocation",
            Self::Ping => "ping",
            Self::Close => "close",
        }
    }
}

/// First frame a client sends: `{"protocol":"json","version":1}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HandshakeRequest {
    pub protocol: String,
    pub version: u32,
}

/// Server answer to the handshake: `{}` or `{"error":"..."}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HandshakeResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// `{"type":1,"target":...,"arguments":[...]}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationMessage {
    #[serde(default)]
    pub invocation_id: Option<String>,
    pub target: String,
    #[serde(default)]
    pub arguments: Vec<Value>,
}

/// `{"type":3,"invocationId":...}` with either `result` or `error`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionMessage {
    pub invocation_id: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `{"type":7}`, optionally with an error and a reconnect hint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseMessage {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub allow_reconnect: bool,
}
