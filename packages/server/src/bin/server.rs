//! Real-time messaging hub server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chathub-server -- --port 9000
//! ```

use std::time::Duration;

use chathub_server::ServerConfig;
use chathub_shared::logger::setup_logger;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "chathub-server", about = "Real-time messaging hub server")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(short, long, default_value_t = 9000)]
    port: u16,

    /// Frames a connection may have queued before it is closed
    #[arg(long, default_value_t = 1024)]
    outbound_capacity: usize,

    /// Seconds between keep-alive pings
    #[arg(long, default_value_t = 15)]
    keep_alive_secs: u64,

    /// Seconds of client silence before the connection is closed
    #[arg(long, default_value_t = 30)]
    client_timeout_secs: u64,

    /// Seconds allowed for the handshake
    #[arg(long, default_value_t = 15)]
    handshake_timeout_secs: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            outbound_capacity: args.outbound_capacity,
            keep_alive_interval: Duration::from_secs(args.keep_alive_secs),
            client_timeout: Duration::from_secs(args.client_timeout_secs),
            handshake_timeout: Duration::from_secs(args.handshake_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    // Run the server
    if let Err(e) = chathub_server::run_server(args.into()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
