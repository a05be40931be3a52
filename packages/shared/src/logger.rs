//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence. Without it, the binary itself, the hub crates
/// and `tower_http` log at `default_level`.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(bin_name, default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(true)
        .init();
}

/// Build the fallback filter directives.
///
/// Target names use the crate name, so dashes in the binary name become
/// underscores.
fn default_directives(bin_name: &str, default_level: &str) -> String {
    let bin_target = bin_name.replace('-', "_");
    format!(
        "{bin_target}={level},chathub_server={level},chathub_client={level},tower_http={level}",
        level = default_level
    )
}
