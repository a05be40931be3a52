//! Interactive command-line client for the chathub hub.

pub mod command;
pub mod error;
pub mod render;
pub mod runner;

// Re-export entry points
pub use error::ClientError;
pub use runner::run_client;
