//! Client main loop: WebSocket I/O on the runtime, line editing on a
//! blocking thread.

use std::time::Duration;

use chathub_server::{
    domain::OutboundFrame,
    infrastructure::codec::{
        Frame, FrameReader, PROTOCOL_NAME, PROTOCOL_VERSION, decode_frame, encode_close,
        encode_handshake_request, encode_ping,
    },
};
use chathub_shared::time::{get_jst_timestamp, timestamp_to_jst_clock};
use futures_util::{SinkExt, StreamExt};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use crate::{
    command::{Command, HELP},
    error::ClientError,
    render::render,
};

/// Interval between client pings; keeps the server's idle timeout at bay.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

type Stream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub async fn run_client(url: &str, display_name: &str) -> Result<(), ClientError> {
    let (mut stream, _) = connect_async(url).await?;
    tracing::info!("Connected to {}", url);

    let mut reader = FrameReader::new();
    let early = handshake(&mut stream, &mut reader).await?;
    println!("Joined as '{display_name}'. {HELP}");
    for frame in early {
        print_frame(&decode_frame(&frame)?);
    }

    let (mut sink, mut source) = stream.split();
    let (line_tx, mut line_rx) = mpsc::channel::<String>(16);
    let prompt = format!("{display_name}> ");
    tokio::task::spawn_blocking(move || read_lines(&prompt, line_tx));

    let mut keep_alive = tokio::time::interval(KEEP_ALIVE_INTERVAL);
    let mut next_invocation_id: u64 = 0;

    loop {
        tokio::select! {
            line = line_rx.recv() => {
                let Some(line) = line else { break };
                let command = match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                next_invocation_id += 1;
                if let Some(frame) = command.to_invocation(display_name, &next_invocation_id.to_string()) {
                    sink.send(text(&frame)).await?;
                }
            }
            message = source.next() => {
                let frames = match message {
                    Some(Ok(Message::Text(payload))) => reader.push(payload.as_str())?,
                    Some(Ok(Message::Binary(payload))) => reader.push_bytes(&payload)?,
                    Some(Ok(Message::Close(_))) | None => {
                        println!("Disconnected from server");
                        return Ok(());
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                };
                for frame in frames {
                    print_frame(&decode_frame(&frame)?);
                }
            }
            _ = keep_alive.tick() => {
                sink.send(text(&encode_ping())).await?;
            }
        }
    }

    sink.send(text(&encode_close(None, false))).await?;
    if let Err(e) = sink.close().await {
        tracing::debug!("Failed to close WebSocket: {}", e);
    }
    println!("Bye");
    Ok(())
}

/// Send the handshake and wait for its answer. Frames that arrived in the
/// same payload as the answer are returned.
async fn handshake(
    stream: &mut Stream,
    reader: &mut FrameReader,
) -> Result<Vec<String>, ClientError> {
    stream
        .send(text(&encode_handshake_request(PROTOCOL_NAME, PROTOCOL_VERSION)))
        .await?;

    while let Some(message) = stream.next().await {
        let frames = match message? {
            Message::Text(payload) => reader.push(payload.as_str())?,
            Message::Binary(payload) => reader.push_bytes(&payload)?,
            Message::Close(_) => break,
            _ => continue,
        };
        let mut frames = frames.into_iter();
        if let Some(first) = frames.next() {
            return match decode_frame(&first)? {
                Frame::HandshakeResponse(response) => match response.error {
                    Some(error) => Err(ClientError::HandshakeRejected(error)),
                    None => Ok(frames.collect()),
                },
                _ => Err(ClientError::HandshakeIncomplete),
            };
        }
    }
    Err(ClientError::HandshakeIncomplete)
}

fn read_lines(prompt: &str, lines: mpsc::Sender<String>) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            tracing::error!("Failed to initialize line editor: {}", e);
            return;
        }
    };

    loop {
        match editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty()
                    && let Err(e) = editor.add_history_entry(line.as_str())
                {
                    tracing::debug!("Failed to record history: {}", e);
                }
                if lines.blocking_send(line).is_err() {
                    return;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                return;
            }
        }
    }
}

fn print_frame(frame: &Frame) {
    let clock = timestamp_to_jst_clock(get_jst_timestamp()).unwrap_or_default();
    if let Some(line) = render(frame, &clock) {
        println!("{line}");
    }
}

fn text(frame: &OutboundFrame) -> Message {
    Message::text(frame.as_str().to_string())
}
