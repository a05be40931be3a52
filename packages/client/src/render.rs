//! Rendering of frames received from the hub.

use chathub_server::infrastructure::{
    codec::{Frame, HubMessage},
    dto::websocket::{RECEIVE_MESSAGE, RECEIVE_SYSTEM_NOTIFICATION},
};
use serde_json::Value;

/// Line to print for `frame`, prefixed with `clock`. Pings and successful
/// completions print nothing.
pub fn render(frame: &Frame, clock: &str) -> Option<String> {
    match frame {
        Frame::Message(HubMessage::Invocation(invocation)) => {
            let text = |index: usize| invocation.arguments.get(index).and_then(Value::as_str);
            match invocation.target.as_str() {
                RECEIVE_MESSAGE => Some(format!(
                    "[{clock}] {}: {}",
                    text(0).unwrap_or("?"),
                    text(1).unwrap_or_default()
                )),
                RECEIVE_SYSTEM_NOTIFICATION => {
                    Some(format!("[{clock}] * {}", text(0).unwrap_or_default()))
                }
                other => Some(format!("[{clock}] (unhandled {other})")),
            }
        }
        Frame::Message(HubMessage::Completion(completion)) => completion
            .error
            .as_ref()
            .map(|error| format!("[{clock}] ! {error}")),
        Frame::Message(HubMessage::Close(close)) => Some(match &close.error {
            Some(error) => format!("[{clock}] Server closed the connection: {error}"),
            None => format!("[{clock}] Server closed the connection"),
        }),
        Frame::Message(HubMessage::Ping) | Frame::HandshakeRequest(_) | Frame::HandshakeResponse(_) => {
            None
        }
    }
}
