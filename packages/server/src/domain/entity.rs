//! Domain entities: the connection lifecycle and hub snapshots.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU8, Ordering},
};

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use super::value_object::{ConnectionId, GroupName, OutboundFrame, Timestamp};

/// Receiving half of a connection's outbound queue, drained by its send loop.
pub type OutboundReceiver = mpsc::Receiver<OutboundFrame>;

/// Lifecycle state of a connection.
///
/// States only ever move forward:
/// `Handshaking -> Open -> Closing -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ConnectionState {
    Handshaking = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Handshaking,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Handshaking => "handshaking",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

/// One client connection as seen by the hub.
///
/// The transport itself is owned by the connection's receive and send loops;
/// this entity carries what the hub shares between them and with other
/// connections: identity, lifecycle state, the outbound queue and the close
/// signal.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    state: AtomicU8,
    outbound: mpsc::Sender<OutboundFrame>,
    closed: CancellationToken,
    overflowed: AtomicBool,
    connected_at: Timestamp,
}

impl Connection {
    /// Create a connection in the Handshaking state.
    ///
    /// # Arguments
    ///
    /// * `id` - Identity assigned by the hub
    /// * `capacity` - Outbound queue bound (must be non-zero)
    /// * `parent` - Shutdown token; cancelling it closes this connection too
    /// * `connected_at` - Time the transport was accepted
    pub fn new(
        id: ConnectionId,
        capacity: usize,
        parent: &CancellationToken,
        connected_at: Timestamp,
    ) -> (Arc<Self>, OutboundReceiver) {
        let (outbound, receiver) = mpsc::channel(capacity);
        let connection = Self {
            id,
            state: AtomicU8::new(ConnectionState::Handshaking as u8),
            outbound,
            closed: parent.child_token(),
            overflowed: AtomicBool::new(false),
            connected_at,
        };
        (Arc::new(connection), receiver)
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    /// Handshaking -> Open. Fails if the connection has started closing.
    pub fn mark_open(&self) -> bool {
        self.advance(ConnectionState::Open)
    }

    /// Handshaking/Open -> Closing.
    ///
    /// Returns `true` for exactly one caller; every later call observes the
    /// connection already closing and returns `false`.
    pub fn begin_close(&self) -> bool {
        self.advance(ConnectionState::Closing)
    }

    /// -> Closed. Terminal.
    pub fn mark_closed(&self) -> bool {
        self.advance(ConnectionState::Closed)
    }

    fn advance(&self, target: ConnectionState) -> bool {
        let target = target as u8;
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < target).then_some(target)
            })
            .is_ok()
    }

    /// Enqueue a frame for delivery.
    ///
    /// Never blocks. A closed connection silently drops the frame. A full
    /// queue drops the frame, marks the connection overflowed and requests it
    /// to close, so a slow peer cannot stall whoever is fanning out.
    pub fn send(&self, frame: OutboundFrame) -> bool {
        if self.state() == ConnectionState::Closed {
            return false;
        }
        match self.outbound.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    connection_id = %self.id,
                    capacity = self.outbound.max_capacity(),
                    "Outbound queue full, closing slow connection"
                );
                self.overflowed.store(true, Ordering::Release);
                self.closed.cancel();
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Ask the connection's loops to stop at their next suspension point.
    pub fn request_close(&self) {
        self.closed.cancel();
    }

    /// Whether the close was caused by a full outbound queue. The send loop
    /// then discards what is still queued instead of flushing it.
    pub fn overflowed(&self) -> bool {
        self.overflowed.load(Ordering::Acquire)
    }

    pub fn is_close_requested(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Resolves once a close has been requested, locally or by hub shutdown.
    pub fn close_requested(&self) -> WaitForCancellationFuture<'_> {
        self.closed.cancelled()
    }

    pub fn summary(&self) -> ConnectionSummary {
        ConnectionSummary {
            id: self.id.clone(),
            state: self.state(),
            connected_at: self.connected_at,
        }
    }
}

/// Point-in-time view of one registered connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSummary {
    pub id: ConnectionId,
    pub state: ConnectionState,
    pub connected_at: Timestamp,
}

/// Point-in-time view of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub name: GroupName,
    pub members: Vec<ConnectionId>,
}

/// Point-in-time view of the whole hub, sorted for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HubSnapshot {
    pub connections: Vec<ConnectionSummary>,
    pub groups: Vec<GroupSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectionIdFactory;

    fn create_connection(capacity: usize) -> (Arc<Connection>, OutboundReceiver, CancellationToken) {
        let shutdown = CancellationToken::new();
        let (connection, rx) = Connection::new(
            ConnectionIdFactory::generate(),
            capacity,
            &shutdown,
            Timestamp::new(0),
        );
        (connection, rx, shutdown)
    }

    fn frame(text: &str) -> OutboundFrame {
        OutboundFrame::new(text.to_string())
    }

    #[test]
    fn test_new_connection_is_handshaking() {
        // テスト項目: 新規接続は Handshaking 状態で始まる
        let (connection, _rx, _shutdown) = create_connection(4);

        assert_eq!(connection.state(), ConnectionState::Handshaking);
        assert!(!connection.is_close_requested());
    }

    #[test]
    fn test_state_transitions_are_forward_only() {
        // テスト項目: 状態遷移は前進のみで、後戻りしない
        // given (前提条件):
        let (connection, _rx, _shutdown) = create_connection(4);

        // when (操作) / then (期待する結果):
        assert!(connection.mark_open());
        assert_eq!(connection.state(), ConnectionState::Open);
        assert!(!connection.mark_open());

        assert!(connection.begin_close());
        assert_eq!(connection.state(), ConnectionState::Closing);
        assert!(!connection.mark_open());

        assert!(connection.mark_closed());
        assert_eq!(connection.state(), ConnectionState::Closed);
        assert!(!connection.begin_close());
        assert!(!connection.mark_closed());
    }

    #[test]
    fn test_begin_close_succeeds_exactly_once() {
        // テスト項目: begin_close は最初の呼び出しだけが成功する
        let (connection, _rx, _shutdown) = create_connection(4);
        connection.mark_open();

        assert!(connection.begin_close());
        assert!(!connection.begin_close());
        assert_eq!(connection.state(), ConnectionState::Closing);
    }

    #[test]
    fn test_mark_open_fails_after_close_started() {
        // テスト項目: ハンドシェイク中に close が始まった接続は Open にならない
        let (connection, _rx, _shutdown) = create_connection(4);

        assert!(connection.begin_close());
        assert!(!connection.mark_open());
    }

    #[test]
    fn test_send_preserves_fifo_order() {
        // テスト項目: 送信キューは FIFO 順を保つ
        // given (前提条件):
        let (connection, mut rx, _shutdown) = create_connection(8);

        // when (操作):
        for i in 0..5 {
            assert!(connection.send(frame(&i.to_string())));
        }

        // then (期待する結果):
        for i in 0..5 {
            assert_eq!(rx.try_recv().unwrap().as_str(), i.to_string());
        }
    }

    #[test]
    fn test_send_on_closed_connection_is_noop() {
        // テスト項目: Closed の接続への送信は何もせずエラーにもならない
        // given (前提条件):
        let (connection, mut rx, _shutdown) = create_connection(4);
        connection.begin_close();
        connection.mark_closed();

        // when (操作):
        let sent = connection.send(frame("late"));

        // then (期待する結果):
        assert!(!sent);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_overflow_requests_close() {
        // テスト項目: キューが溢れるとフレームを捨てて close を要求する
        // given (前提条件): 容量 2
        let (connection, mut rx, _shutdown) = create_connection(2);
        assert!(connection.send(frame("1")));
        assert!(connection.send(frame("2")));

        // when (操作):
        let sent = connection.send(frame("3"));

        // then (期待する結果):
        assert!(!sent);
        assert!(connection.is_close_requested());
        assert!(connection.overflowed());
        assert_eq!(rx.try_recv().unwrap().as_str(), "1");
        assert_eq!(rx.try_recv().unwrap().as_str(), "2");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_requested_close_is_not_overflow() {
        // テスト項目: 通常の close 要求では overflowed にならない
        // given (前提条件): 容量 1
        let (connection, _rx, _shutdown) = create_connection(1);
        assert!(connection.send(frame("1")));

        // when (操作):
        connection.request_close();

        // then (期待する結果):
        assert!(connection.is_close_requested());
        assert!(!connection.overflowed());
    }

    #[test]
    fn test_shutdown_token_propagates_to_connection() {
        // テスト項目: Hub のシャットダウンが接続の close 要求として伝わる
        let (connection, _rx, shutdown) = create_connection(4);

        shutdown.cancel();

        assert!(connection.is_close_requested());
    }

    #[test]
    fn test_summary_reflects_state() {
        // テスト項目: summary が現在の状態を反映する
        let (connection, _rx, _shutdown) = create_connection(4);
        connection.mark_open();

        let summary = connection.summary();

        assert_eq!(&summary.id, connection.id());
        assert_eq!(summary.state, ConnectionState::Open);
        assert_eq!(summary.state.as_str(), "open");
    }
}
