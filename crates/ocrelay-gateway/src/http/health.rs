use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness of the relay itself; does not contact the
/// OpenCode Server.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "server_url": state.router.dispatcher().api().base_url(),
        "conversations": state.router.contexts().len(),
    }))
}
