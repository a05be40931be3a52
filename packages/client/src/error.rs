//! Client error definitions.

use chathub_server::infrastructure::codec::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("handshake rejected: {0}")]
    HandshakeRejected(String),

    #[error("connection closed during handshake")]
    HandshakeIncomplete,

    #[error("invalid frame from server: {0}")]
    Codec(#[from] CodecError),
}
