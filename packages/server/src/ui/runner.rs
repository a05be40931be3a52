//! Server startup: router wiring, listener and graceful shutdown.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    error::ServerError,
    infrastructure::repository::InMemoryHubRepository,
    ui::{
        handler::{broadcast, health_check, hub_method::builtin_dispatch_table, hub_state, websocket_handler},
        hub::Hub,
        signal::shutdown_signal,
        state::AppState,
    },
};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chatHub", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/hub", get(hub_state))
        .route("/System/Broadcast", post(broadcast))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `config.addr()` and serve until Ctrl-C / SIGTERM.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    serve(listener, config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// On shutdown every open connection is asked to close.
pub async fn serve<F>(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    config.validate()?;

    let repository = Arc::new(InMemoryHubRepository::new());
    let hub = Arc::new(Hub::new(
        repository,
        builtin_dispatch_table(),
        config.outbound_capacity,
    ));
    let state = Arc::new(AppState {
        hub: hub.clone(),
        config,
    });
    let app = build_router(state);

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Listening on {}", addr),
        Err(e) => tracing::warn!("Listening on unknown address: {}", e),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("Shutting down, closing all connections");
            hub.shutdown();
        })
        .await
        .map_err(ServerError::Serve)
}
