//! WebSocket layer: upgrade handling and the per-connection transport
//! adapter.
//!
//! The endpoint at `/ws/{client_id}` joins the caller to the relay.

pub mod connection;
pub mod handler;
