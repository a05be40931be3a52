//! UI layer: HTTP and WebSocket endpoints in front of the hub.

pub mod dispatch;
mod handler;
pub mod hub;
mod runner;
mod signal;
pub mod state;

pub use runner::{build_router, run, serve};
