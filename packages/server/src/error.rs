//! Server-level error definitions.

use std::io;

use thiserror::Error;

use crate::{
    config::ConfigError, infrastructure::codec::CodecError,
    infrastructure::dto::websocket::MessageKind,
};

/// Violations of the hub protocol. Every variant closes the connection.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("a handshake request must be the first frame")]
    HandshakeRequired,

    #[error("handshake was already completed")]
    UnexpectedHandshake,

    #[error("handshake rejected: {0}")]
    HandshakeRejected(String),

    #[error("handshake did not complete in time")]
    HandshakeTimeout,

    #[error("unknown hub method '{0}'")]
    UnknownTarget(String),

    #[error("'{target}' takes {expected} argument(s), got {actual}")]
    ArityMismatch {
        target: String,
        expected: usize,
        actual: usize,
    },

    #[error("argument {index} of '{target}' must be a {expected}")]
    InvalidArgument {
        target: String,
        index: usize,
        expected: &'static str,
    },

    #[error("unexpected {} message from client", .0.name())]
    UnexpectedMessage(MessageKind),

    #[error("connection closed before it could be registered")]
    RegistrationFailed,
}

/// Failures that stop the server itself.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}
