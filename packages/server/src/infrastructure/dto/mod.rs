//! Data transfer objects for the wire protocol and the HTTP API.

pub mod http;
pub mod websocket;
