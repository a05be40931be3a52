//! Helpers shared by unit tests.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{Connection, ConnectionIdFactory, HubRepository, OutboundReceiver, Timestamp},
    infrastructure::{
        codec::{Frame, HubMessage, decode_frame, split_frames},
        repository::InMemoryHubRepository,
    },
    usecase::notification::{connected_text, system_notification},
};

/// A fresh connection that has not completed its handshake.
pub fn handshaking_connection(
    shutdown: &CancellationToken,
) -> (Arc<Connection>, OutboundReceiver) {
    Connection::new(
        ConnectionIdFactory::generate(),
        16,
        shutdown,
        Timestamp::new(1_700_000_000_000),
    )
}

/// A connection registered in `repository` (connect notification sent).
pub async fn register(
    repository: &InMemoryHubRepository,
    shutdown: &CancellationToken,
) -> (Arc<Connection>, OutboundReceiver) {
    let (connection, receiver) = handshaking_connection(shutdown);
    repository
        .add_connection(
            connection.clone(),
            system_notification(connected_text(connection.id())),
        )
        .await
        .unwrap();
    (connection, receiver)
}

/// Every queued invocation as `(target, arguments)`; other frames are skipped.
pub fn drain_invocations(receiver: &mut OutboundReceiver) -> Vec<(String, Vec<Value>)> {
    let mut invocations = Vec::new();
    while let Ok(frame) = receiver.try_recv() {
        for segment in split_frames(frame.as_str()) {
            if let Ok(Frame::Message(HubMessage::Invocation(invocation))) = decode_frame(segment) {
                invocations.push((invocation.target, invocation.arguments));
            }
        }
    }
    invocations
}
