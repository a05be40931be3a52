//! System notification texts and frames.
//!
//! Every server-originated notice is a `ReceiveSystemNotification`
//! invocation with a single text argument.

use serde_json::Value;

use crate::{
    domain::{ConnectionId, GroupName, OutboundFrame},
    infrastructure::{
        codec::encode_invocation,
        dto::websocket::{RECEIVE_MESSAGE, RECEIVE_SYSTEM_NOTIFICATION},
    },
};

/// Prefix of notifications triggered through the admin broadcast endpoint.
pub const ADMIN_PREFIX: &str = "[System Admin]: ";

pub fn connected_text(id: &ConnectionId) -> String {
    format!("User {id} connected")
}

pub fn disconnected_text(id: &ConnectionId) -> String {
    format!("User {id} disconnected")
}

pub fn joined_text(id: &ConnectionId, group: &GroupName) -> String {
    format!("User {id} joined {group}")
}

pub fn left_text(id: &ConnectionId, group: &GroupName) -> String {
    format!("User {id} left {group}")
}

pub fn admin_text(message: &str) -> String {
    format!("{ADMIN_PREFIX}{message}")
}

pub fn system_notification(text: String) -> OutboundFrame {
    encode_invocation(None, RECEIVE_SYSTEM_NOTIFICATION, vec![Value::String(text)])
}

/// `ReceiveMessage [displayName, text]`
pub fn chat_message(display_name: &str, text: &str) -> OutboundFrame {
    encode_invocation(
        None,
        RECEIVE_MESSAGE,
        vec![Value::from(display_name), Value::from(text)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id() -> ConnectionId {
        ConnectionId::new("c-1".to_string()).unwrap()
    }

    #[test]
    fn test_notification_texts() {
        // テスト項目: 通知文のテンプレート
        let group = GroupName::new("r".to_string()).unwrap();

        assert_eq!(connected_text(&id()), "User c-1 connected");
        assert_eq!(disconnected_text(&id()), "User c-1 disconnected");
        assert_eq!(joined_text(&id(), &group), "User c-1 joined r");
        assert_eq!(left_text(&id(), &group), "User c-1 left r");
        assert_eq!(admin_text("hi"), "[System Admin]: hi");
    }

    #[test]
    fn test_system_notification_frame() {
        // テスト項目: システム通知は ReceiveSystemNotification の Invocation になる
        let frame = system_notification("hello".to_string());
        let value: serde_json::Value =
            serde_json::from_str(frame.as_str().trim_end_matches('\u{1e}')).unwrap();

        assert_eq!(
            value,
            json!({"type": 1, "target": "ReceiveSystemNotification", "arguments": ["hello"]})
        );
    }
}
