//! WebSocket transport for the hub.
//!
//! Every connection runs one receive loop and one send loop. The receive loop
//! is the only reader of the socket and the send loop its only writer; they
//! share the [`Connection`] entity and stop together through its close token.

use std::{ops::ControlFlow, sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::{Sink, SinkExt},
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::time::{Instant, MissedTickBehavior};

use crate::{
    domain::{Connection, ConnectionState, OutboundFrame, OutboundReceiver},
    error::ProtocolError,
    infrastructure::codec::{
        Frame, FrameReader, HubMessage, decode_frame, encode_handshake_response, encode_ping,
        validate_handshake,
    },
    ui::{hub::Hub, state::AppState},
};

/// How long a closing connection may spend writing out its queue.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (connection, outbound) = state.hub.open_connection();
    tracing::info!(connection_id = %connection.id(), "WebSocket connection accepted");

    let (sender, receiver) = socket.split();

    let recv_task = tokio::spawn(receive_loop(
        receiver,
        connection.clone(),
        state.hub.clone(),
        state.config.handshake_timeout,
        state.config.client_timeout,
    ));
    let send_task = tokio::spawn(send_loop(
        sender,
        outbound,
        connection.clone(),
        state.hub.clone(),
        state.config.keep_alive_interval,
    ));

    let (recv_result, send_result) = tokio::join!(recv_task, send_task);
    for result in [recv_result, send_result] {
        if let Err(e) = result {
            tracing::error!(connection_id = %connection.id(), "Connection task failed: {}", e);
        }
    }

    // A panicking loop skips its own close.
    state.hub.close_connection(&connection).await;
    tracing::info!(connection_id = %connection.id(), "WebSocket connection finished");
}

async fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    connection: Arc<Connection>,
    hub: Arc<Hub>,
    handshake_timeout: Duration,
    client_timeout: Duration,
) {
    let mut reader = FrameReader::new();
    let mut deadline = Instant::now() + handshake_timeout;

    loop {
        let message = tokio::select! {
            _ = connection.close_requested() => break,
            _ = tokio::time::sleep_until(deadline) => {
                if connection.state() == ConnectionState::Handshaking {
                    report_protocol_error(&connection, &ProtocolError::HandshakeTimeout);
                } else {
                    tracing::warn!(
                        connection_id = %connection.id(),
                        timeout = ?client_timeout,
                        "Client timed out"
                    );
                }
                break;
            }
            message = receiver.next() => message,
        };

        let frames = match message {
            Some(Ok(Message::Text(text))) => reader.push(text.as_str()),
            Some(Ok(Message::Binary(bytes))) => reader.push_bytes(&bytes),
            // Pings are answered by the WebSocket layer.
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => Ok(Vec::new()),
            Some(Ok(Message::Close(_))) | None => {
                tracing::info!(connection_id = %connection.id(), "Client closed the transport");
                break;
            }
            Some(Err(e)) => {
                tracing::warn!(connection_id = %connection.id(), "WebSocket read failed: {}", e);
                break;
            }
        };

        let flow = match frames {
            Ok(frames) => process_frames(&hub, &connection, frames).await,
            Err(e) => Err(ProtocolError::from(e)),
        };
        match flow {
            Ok(ControlFlow::Continue(())) => {}
            Ok(ControlFlow::Break(())) => break,
            Err(error) => {
                report_protocol_error(&connection, &error);
                break;
            }
        }

        if connection.state() == ConnectionState::Open {
            deadline = Instant::now() + client_timeout;
        }
    }

    hub.close_connection(&connection).await;
}

async fn process_frames(
    hub: &Hub,
    connection: &Arc<Connection>,
    frames: Vec<String>,
) -> Result<ControlFlow<()>, ProtocolError> {
    for frame in frames {
        if connection.is_close_requested() {
            return Ok(ControlFlow::Break(()));
        }
        if process_frame(hub, connection, &frame).await?.is_break() {
            return Ok(ControlFlow::Break(()));
        }
    }
    Ok(ControlFlow::Continue(()))
}

async fn process_frame(
    hub: &Hub,
    connection: &Arc<Connection>,
    segment: &str,
) -> Result<ControlFlow<()>, ProtocolError> {
    let frame = decode_frame(segment)?;
    tracing::debug!(connection_id = %connection.id(), frame = segment, "Frame received");

    match (connection.state(), frame) {
        (ConnectionState::Handshaking, Frame::HandshakeRequest(request)) => {
            if let Err(reason) = validate_handshake(&request) {
                return Err(ProtocolError::HandshakeRejected(reason));
            }
            // The ack is queued before registration so it precedes every
            // frame fanned out to this connection.
            connection.send(encode_handshake_response(None));
            hub.complete_handshake(connection).await?;
            Ok(ControlFlow::Continue(()))
        }
        (ConnectionState::Handshaking, _) => Err(ProtocolError::HandshakeRequired),
        (_, Frame::HandshakeRequest(_) | Frame::HandshakeResponse(_)) => {
            Err(ProtocolError::UnexpectedHandshake)
        }
        (_, Frame::Message(HubMessage::Invocation(invocation))) => {
            hub.invoke(connection, invocation).await?;
            Ok(ControlFlow::Continue(()))
        }
        (_, Frame::Message(HubMessage::Ping)) => Ok(ControlFlow::Continue(())),
        (_, Frame::Message(HubMessage::Close(close))) => {
            tracing::info!(
                connection_id = %connection.id(),
                error = close.error.as_deref().unwrap_or_default(),
                "Client sent close message"
            );
            Ok(ControlFlow::Break(()))
        }
        (_, Frame::Message(message @ HubMessage::Completion(_))) => {
            Err(ProtocolError::UnexpectedMessage(message.kind()))
        }
    }
}

/// Log a protocol error. The caller then closes the transport without any
/// further hub frame, except that a rejected handshake gets its response.
fn report_protocol_error(connection: &Connection, error: &ProtocolError) {
    tracing::warn!(
        connection_id = %connection.id(),
        %error,
        "Protocol error, closing connection"
    );
    if let ProtocolError::HandshakeRejected(reason) = error {
        connection.send(encode_handshake_response(Some(reason.as_str())));
    }
}

async fn send_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound: OutboundReceiver,
    connection: Arc<Connection>,
    hub: Arc<Hub>,
    keep_alive_interval: Duration,
) {
    let mut keep_alive =
        tokio::time::interval_at(Instant::now() + keep_alive_interval, keep_alive_interval);
    keep_alive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = connection.close_requested() => {
                finish_session(&mut sender, &mut outbound, &connection, CLOSE_FLUSH_TIMEOUT).await;
                break;
            }
            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                if let Err(e) = write_frame(&mut sender, &frame).await {
                    tracing::warn!(connection_id = %connection.id(), "WebSocket write failed: {}", e);
                    break;
                }
            }
            _ = keep_alive.tick() => {
                if connection.state() != ConnectionState::Open {
                    continue;
                }
                if let Err(e) = write_frame(&mut sender, &encode_ping()).await {
                    tracing::warn!(connection_id = %connection.id(), "Keep-alive ping failed: {}", e);
                    break;
                }
            }
        }
    }

    hub.close_connection(&connection).await;
}

/// End the WebSocket session of a connection whose close was requested.
///
/// An overflowed connection has its queue discarded. Otherwise the queue is
/// flushed, but never for longer than `flush_timeout`.
async fn finish_session<S>(
    sender: &mut S,
    outbound: &mut OutboundReceiver,
    connection: &Connection,
    flush_timeout: Duration,
) where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    if connection.overflowed() {
        tracing::debug!(
            connection_id = %connection.id(),
            "Discarding queued frames of overflowed connection"
        );
        return;
    }
    let flush = flush_and_close(sender, outbound, connection);
    if tokio::time::timeout(flush_timeout, flush).await.is_err() {
        tracing::warn!(
            connection_id = %connection.id(),
            timeout = ?flush_timeout,
            "Flush on close timed out, dropping the transport"
        );
    }
}

/// Deliver what is already queued, then end the WebSocket session.
async fn flush_and_close<S>(sender: &mut S, outbound: &mut OutboundReceiver, connection: &Connection)
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    while let Ok(frame) = outbound.try_recv() {
        if let Err(e) = write_frame(sender, &frame).await {
            tracing::debug!(connection_id = %connection.id(), "Dropping queued frames: {}", e);
            return;
        }
    }
    if let Err(e) = sender.send(Message::Close(None)).await {
        tracing::debug!(connection_id = %connection.id(), "Failed to send close frame: {}", e);
    }
}

async fn write_frame<S>(sender: &mut S, frame: &OutboundFrame) -> Result<(), S::Error>
where
    S: Sink<Message> + Unpin,
{
    sender.send(Message::Text(frame.as_str().to_string().into())).await
}
