//! Real-time messaging hub.
//!
//! Clients hold a WebSocket connection, exchange 0x1E-terminated JSON frames,
//! join named groups and receive system notifications. An HTTP endpoint lets
//! operators broadcast to everyone.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

#[cfg(test)]
mod test_support;

// Re-export entry points
pub use config::ServerConfig;
pub use ui::{build_router, run as run_server, serve};
