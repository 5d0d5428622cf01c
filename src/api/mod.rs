//! HTTP layer: router composition.
//!
//! Mounts the WebSocket endpoint and the system routes, with CORS and
//! request tracing applied to everything.

pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the complete application router with state attached.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(handlers::system::routes())
        .route("/ws/{client_id}", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
