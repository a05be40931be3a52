//! Handler modules for HTTP, WebSocket and hub method endpoints.

pub mod http;
pub mod hub_method;
pub mod websocket;

// Re-export HTTP handlers
pub use http::{broadcast, health_check, hub_state};

// Re-export WebSocket handlers
pub use websocket::websocket_handler;
