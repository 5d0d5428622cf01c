//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::ClientId;

/// `GET /ws/{client_id}` — Upgrade HTTP connection to WebSocket.
///
/// The path segment is taken as the client's display identity without
/// validation. A failed handshake never reaches the session, so nothing
/// is registered or announced for it.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(raw_client_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let client_id = ClientId::parse(&raw_client_id);
    let registry = Arc::clone(&state.registry);
    let queue_capacity = state.outbound_queue_capacity;

    ws.on_failed_upgrade(|e| tracing::warn!(error = %e, "ws handshake failed"))
        .on_upgrade(move |socket| async move {
            run_connection(socket, client_id, registry, queue_capacity).await;
        })
}
