//! Shared fixtures for integration tests.
//!
//! `TestServer` runs the hub in-process on an ephemeral port; `HubClient`
//! speaks the hub protocol over `tokio-tungstenite`.

#![allow(dead_code)]

use std::{collections::VecDeque, net::SocketAddr, time::Duration};

use chathub_server::{
    ServerConfig,
    infrastructure::codec::{
        Frame, FrameReader, HubMessage, decode_frame, encode_handshake_request, encode_invocation,
    },
    infrastructure::dto::websocket::CompletionMessage,
    serve,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

/// How long a test waits for a frame it expects.
pub const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.await;
            };
            serve(listener, config, shutdown)
                .await
                .expect("Test server failed");
        });

        Self {
            addr,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hub_url(&self) -> String {
        format!("ws://{}/chatHub", self.addr)
    }

    pub async fn hub_state(&self) -> Value {
        reqwest::get(format!("{}/api/hub", self.base_url()))
            .await
            .expect("Failed to fetch hub state")
            .json()
            .await
            .expect("Failed to parse hub state")
    }

    pub async fn connection_ids(&self) -> Vec<String> {
        self.hub_state().await["connections"]
            .as_array()
            .expect("connections should be an array")
            .iter()
            .map(|connection| connection["connection_id"].as_str().unwrap().to_string())
            .collect()
    }

    /// Connect a client and return it with the connection id the hub assigned.
    pub async fn connect_client(&self) -> (HubClient, String) {
        let before = self.connection_ids().await;
        let client = HubClient::connect(&self.hub_url()).await;
        let id = self
            .connection_ids()
            .await
            .into_iter()
            .find(|id| !before.contains(id))
            .expect("new connection should be registered");
        (client, id)
    }

    /// Trigger the admin broadcast and return the recipient count.
    pub async fn broadcast(&self, message: &str) -> Value {
        reqwest::Client::new()
            .post(format!("{}/System/Broadcast", self.base_url()))
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await
            .expect("Failed to send broadcast")
            .json()
            .await
            .expect("Failed to parse broadcast response")
    }

    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            tokio::time::timeout(RECEIVE_TIMEOUT, handle)
                .await
                .expect("Server did not shut down")
                .expect("Server task panicked");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

type Stream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub struct HubClient {
    stream: Stream,
    reader: FrameReader,
    pending: VecDeque<Frame>,
    next_invocation_id: u64,
    closed: bool,
}

impl HubClient {
    /// Open the transport without performing the handshake.
    pub async fn connect_raw(url: &str) -> Self {
        let (stream, _) = connect_async(url)
            .await
            .expect("Failed to connect to hub");
        Self {
            stream,
            reader: FrameReader::new(),
            pending: VecDeque::new(),
            next_invocation_id: 0,
            closed: false,
        }
    }

    /// Connect, handshake, and wait until the hub has registered us.
    pub async fn connect(url: &str) -> Self {
        let mut client = Self::connect_raw(url).await;
        client
            .send_text(encode_handshake_request("json", 1).as_str())
            .await;
        match client.next_frame().await {
            Some(Frame::HandshakeResponse(response)) => {
                assert_eq!(response.error, None, "handshake should be accepted")
            }
            other => panic!("expected handshake response, got {other:?}"),
        }
        client.round_trip().await;
        client
    }

    pub async fn send_text(&mut self, text: &str) {
        self.stream
            .send(Message::text(text.to_string()))
            .await
            .expect("Failed to send frame");
    }

    pub async fn send_invocation(&mut self, target: &str, arguments: Vec<Value>) {
        self.send_text(encode_invocation(None, target, arguments).as_str())
            .await;
    }

    /// Invoke with an `invocationId` and wait for its completion.
    /// Frames arriving in the meantime stay queued for `next_*`.
    pub async fn invoke(&mut self, target: &str, arguments: Vec<Value>) -> CompletionMessage {
        self.next_invocation_id += 1;
        let id = self.next_invocation_id.to_string();
        self.send_text(encode_invocation(Some(id.as_str()), target, arguments).as_str())
            .await;

        let mut held = VecDeque::new();
        let completion = loop {
            match self.read_frame().await {
                Some(Frame::Message(HubMessage::Completion(completion)))
                    if completion.invocation_id == id =>
                {
                    break completion;
                }
                Some(frame) => held.push_back(frame),
                None => panic!("connection closed while waiting for completion {id}"),
            }
        };
        held.append(&mut self.pending);
        self.pending = held;
        completion
    }

    /// Wait until the hub has processed everything sent so far.
    pub async fn round_trip(&mut self) {
        self.invoke("LeaveRoom", vec![Value::from("__round_trip__")])
            .await;
    }

    /// Next frame, or `None` when the transport closes or nothing arrives in time.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        if let Some(frame) = self.pending.pop_front() {
            return Some(frame);
        }
        self.read_frame().await
    }

    async fn read_frame(&mut self) -> Option<Frame> {
        if let Some(frame) = self.pending.pop_front() {
            return Some(frame);
        }
        loop {
            let message = tokio::time::timeout(RECEIVE_TIMEOUT, self.stream.next())
                .await
                .ok()?;
            let frames = match message {
                Some(Ok(Message::Text(text))) => self.reader.push(text.as_str()),
                Some(Ok(Message::Binary(bytes))) => self.reader.push_bytes(&bytes),
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                    self.closed = true;
                    return None;
                }
                Some(Ok(_)) => continue,
            }
            .expect("server sent an undecodable payload");

            let mut decoded = frames
                .iter()
                .map(|frame| decode_frame(frame).expect("server sent an invalid frame"));
            if let Some(first) = decoded.next() {
                self.pending.extend(decoded);
                return Some(first);
            }
        }
    }

    /// Next invocation as `(target, arguments)`, skipping pings and completions.
    pub async fn next_invocation(&mut self) -> (String, Vec<Value>) {
        loop {
            match self.next_frame().await {
                Some(Frame::Message(HubMessage::Invocation(invocation))) => {
                    return (invocation.target, invocation.arguments);
                }
                Some(Frame::Message(HubMessage::Ping | HubMessage::Completion(_))) => continue,
                other => panic!("expected an invocation, got {other:?}"),
            }
        }
    }

    /// Text of the next `ReceiveSystemNotification`.
    pub async fn next_notification(&mut self) -> String {
        let (target, arguments) = self.next_invocation().await;
        assert_eq!(target, "ReceiveSystemNotification");
        arguments[0].as_str().unwrap().to_string()
    }

    /// Assert that no invocation arrives within `window`.
    pub async fn expect_silence(&mut self, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return;
            }
            match tokio::time::timeout(remaining, self.next_frame()).await {
                Err(_) | Ok(None) => return,
                Ok(Some(Frame::Message(HubMessage::Ping | HubMessage::Completion(_)))) => {}
                Ok(Some(frame)) => panic!("expected silence, got {frame:?}"),
            }
        }
    }

    /// Read until the server closes the transport; returns what arrived first.
    ///
    /// Panics if the transport is still open after [`RECEIVE_TIMEOUT`] of silence.
    pub async fn frames_until_closed(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame().await {
            frames.push(frame);
        }
        assert!(
            self.closed,
            "transport still open after {RECEIVE_TIMEOUT:?}, got {frames:?}"
        );
        frames
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
