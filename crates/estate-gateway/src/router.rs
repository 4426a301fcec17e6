//! Axum router wiring.
//!
//! - `/ws`           : WebSocket upgrade for the chat relay
//! - `/test-backend` : liveness check

use axum::{routing::get, Router};

use crate::{app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(transport::ws::ws_upgrade))
        .route("/test-backend", get(test_backend))
        .with_state(state)
}

async fn test_backend() -> &'static str {
    "Backend is working!"
}
