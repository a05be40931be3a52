//! Interactive hub client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chathub-client -- --name alice
//! ```

use chathub_shared::logger::setup_logger;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "chathub-client", about = "Interactive chathub client")]
struct Args {
    /// Hub WebSocket endpoint
    #[arg(short, long, default_value = "ws://127.0.0.1:9000/chatHub")]
    url: String,

    /// Name shown next to your messages
    #[arg(short, long)]
    name: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    if let Err(e) = chathub_client::run_client(&args.url, &args.name).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
