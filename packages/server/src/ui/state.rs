//! Shared application state.

use std::sync::Arc;

use crate::{config::ServerConfig, ui::hub::Hub};

/// Shared application state
pub struct AppState {
    /// Hub core (connections, groups, dispatch)
    pub hub: Arc<Hub>,
    /// Timeouts and limits applied to every connection
    pub config: ServerConfig,
}
