use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use ocrelay_channels::CommandRouter;
use ocrelay_client::OpenCodeClient;
use ocrelay_commands::Dispatcher;
use ocrelay_core::RelayConfig;

/// Shared state, passed as `Arc<AppState>` to all Axum handlers.
pub struct AppState {
    pub config: RelayConfig,
    pub router: CommandRouter<OpenCodeClient>,
}

impl AppState {
    pub fn new(config: RelayConfig) -> anyhow::Result<Self> {
        let client = OpenCodeClient::new(&config.opencode)?;
        let router = CommandRouter::new(Dispatcher::new(client, config.chat.clone()));
        Ok(Self { config, router })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/v1/messages", post(crate::http::messages::messages_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
