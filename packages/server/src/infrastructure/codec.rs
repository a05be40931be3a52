//! Hub protocol frame codec.
//!
//! A frame is one JSON object terminated by the ASCII record separator
//! (0x1E). One transport payload may carry several frames; a frame may also
//! be split across payloads, in which case [`FrameReader`] holds the
//! unterminated tail until the rest arrives.

use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::{
    domain::OutboundFrame,
    infrastructure::dto::websocket::{
        CloseMessage, CompletionMessage, HandshakeRequest, HandshakeResponse, InvocationMessage,
        MessageKind,
    },
};

/// Frame terminator.
pub const RECORD_SEPARATOR: char = '\u{1e}';

/// The only protocol this hub speaks.
pub const PROTOCOL_NAME: &str = "json";
pub const PROTOCOL_VERSION: u32 = 1;

/// Upper bound on an unterminated frame held between payloads.
pub const MAX_BUFFERED_BYTES: usize = 1024 * 1024;

/// Errors raised while decoding frames
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("frame has an unrecognized shape")]
    UnrecognizedFrame,

    #[error("unsupported message type {0}")]
    UnsupportedMessageType(u64),

    #[error("malformed {kind} frame: {source}")]
    InvalidMessage {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("unterminated frame exceeds {max} bytes")]
    FrameTooLarge { max: usize },
}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    HandshakeRequest(HandshakeRequest),
    HandshakeResponse(HandshakeResponse),
    Message(HubMessage),
}

/// A decoded hub message (anything carrying a `type`).
#[derive(Debug, Clone, PartialEq)]
pub enum HubMessage {
    Invocation(InvocationMessage),
    Completion(CompletionMessage),
    Ping,
    Close(CloseMessage),
}

impl HubMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Invocation(_) => MessageKind::Invocation,
            Self::Completion(_) => MessageKind::Completion,
            Self::Ping => MessageKind::Ping,
            Self::Close(_) => MessageKind::Close,
        }
    }
}

/// Reassembles frames from transport payloads.
#[derive(Debug, Default)]
pub struct FrameReader {
    pending: String,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a payload and return every frame it completes, in order.
    /// Empty segments are discarded.
    pub fn push(&mut self, payload: &str) -> Result<Vec<String>, CodecError> {
        self.pending.push_str(payload);

        let frames = match self.pending.rfind(RECORD_SEPARATOR) {
            Some(last) => {
                let tail = self.pending.split_off(last + RECORD_SEPARATOR.len_utf8());
                let complete = std::mem::replace(&mut self.pending, tail);
                split_frames(&complete).map(str::to_owned).collect()
            }
            None => Vec::new(),
        };

        if self.pending.len() > MAX_BUFFERED_BYTES {
            self.pending.clear();
            return Err(CodecError::FrameTooLarge {
                max: MAX_BUFFERED_BYTES,
            });
        }
        Ok(frames)
    }

    /// Same as [`push`](Self::push) for binary transport messages.
    pub fn push_bytes(&mut self, payload: &[u8]) -> Result<Vec<String>, CodecError> {
        let text = std::str::from_utf8(payload).map_err(|_| CodecError::InvalidUtf8)?;
        self.push(text)
    }

    /// Whether an unterminated frame is being held.
    #[cfg(test)]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Split a payload made only of complete frames.
pub fn split_frames(payload: &str) -> impl Iterator<Item = &str> {
    payload
        .split(RECORD_SEPARATOR)
        .filter(|segment| !segment.is_empty())
}

/// Decode one frame (without its terminator).
///
/// Handshake frames are recognised by shape since they carry no `type`: a
/// request has `protocol`, a response is `{}` or carries only `error`.
pub fn decode_frame(segment: &str) -> Result<Frame, CodecError> {
    let value: Value = serde_json::from_str(segment).map_err(CodecError::InvalidJson)?;
    let object = value.as_object().ok_or(CodecError::NotAnObject)?;

    match object.get("type") {
        Some(kind) => {
            let code = kind.as_u64().ok_or(CodecError::UnrecognizedFrame)?;
            decode_message(code, value).map(Frame::Message)
        }
        None if object.contains_key("protocol") => serde_json::from_value(value)
            .map(Frame::HandshakeRequest)
            .map_err(|source| CodecError::InvalidMessage {
                kind: "handshake request",
                source,
            }),
        None if object.keys().all(|key| key == "error") => serde_json::from_value(value)
            .map(Frame::HandshakeResponse)
            .map_err(|source| CodecError::InvalidMessage {
                kind: "handshake response",
                source,
            }),
        None => Err(CodecError::UnrecognizedFrame),
    }
}

fn decode_message(code: u64, value: Value) -> Result<HubMessage, CodecError> {
    let kind = MessageKind::from_code(code).ok_or(CodecError::UnsupportedMessageType(code))?;
    let invalid = |source| CodecError::InvalidMessage {
        kind: kind.name(),
        source,
    };

    match kind {
        MessageKind::Invocation => serde_json::from_value(value)
            .map(HubMessage::Invocation)
            .map_err(invalid),
        MessageKind::Completion => serde_json::from_value(value)
            .map(HubMessage::Completion)
            .map_err(invalid),
        MessageKind::Ping => Ok(HubMessage::Ping),
        MessageKind::Close => serde_json::from_value(value)
            .map(HubMessage::Close)
            .map_err(invalid),
        MessageKind::StreamItem | MessageKind::StreamInvocation | MessageKind::CancelInvocation => {
            Err(CodecError::UnsupportedMessageType(code))
        }
    }
}

/// Check a handshake request against what this hub speaks.
///
/// The error text is sent back to the client in the handshake response.
pub fn validate_handshake(request: &HandshakeRequest) -> Result<(), String> {
    if request.protocol != PROTOCOL_NAME {
        return Err(format!(
            "Requested protocol '{}' is not available.",
            request.protocol
        ));
    }
    if request.version != PROTOCOL_VERSION {
        return Err(format!(
            "The server does not support version {} of the '{}' protocol.",
            request.version, request.protocol
        ));
    }
    Ok(())
}

fn terminate(value: Value) -> OutboundFrame {
    let mut encoded = value.to_string();
    encoded.push(RECORD_SEPARATOR);
    OutboundFrame::new(encoded)
}

pub fn encode_handshake_request(protocol: &str, version: u32) -> OutboundFrame {
    terminate(json!({ "protocol": protocol, "version": version }))
}

/// `{}` acknowledges the handshake; `{"error":...}` rejects it.
pub fn encode_handshake_response(error: Option<&str>) -> OutboundFrame {
    let mut object = Map::new();
    if let Some(error) = error {
        object.insert("error".to_string(), Value::from(error));
    }
    terminate(Value::Object(object))
}

pub fn encode_invocation(
    invocation_id: Option<&str>,
    target: &str,
    arguments: Vec<Value>,
) -> OutboundFrame {
    let mut object = Map::new();
    object.insert("type".to_string(), Value::from(MessageKind::Invocation.code()));
    if let Some(id) = invocation_id {
        object.insert("invocationId".to_string(), Value::from(id));
    }
    object.insert("target".to_string(), Value::from(target));
    object.insert("arguments".to_string(), Value::Array(arguments));
    terminate(Value::Object(object))
}

/// Completion for an invocation that carried an `invocationId`.
///
/// `Ok(None)` completes without a result (void methods).
pub fn encode_completion(invocation_id: &str, outcome: Result<Option<Value>, &str>) -> OutboundFrame {
    let mut object = Map::new();
    object.insert("type".to_string(), Value::from(MessageKind::Completion.code()));
    object.insert("invocationId".to_string(), Value::from(invocation_id));
    match outcome {
        Ok(Some(result)) => {
            object.insert("result".to_string(), result);
        }
        Ok(None) => {}
        Err(error) => {
            object.insert("error".to_string(), Value::from(error));
        }
    }
    terminate(Value::Object(object))
}

pub fn encode_ping() -> OutboundFrame {
    terminate(json!({ "type": MessageKind::Ping.code() }))
}

pub fn encode_close(error: Option<&str>, allow_reconnect: bool) -> OutboundFrame {
    let mut object = Map::new();
    object.insert("type".to_string(), Value::from(MessageKind::Close.code()));
    if let Some(error) = error {
        object.insert("error".to_string(), Value::from(error));
    }
    if allow_reconnect {
        object.insert("allowReconnect".to_string(), Value::Bool(true));
    }
    terminate(Value::Object(object))
}
